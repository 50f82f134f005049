//! ApplyDamage: DamageRequest → health / knockback / death
//!
//! Шаги на один принятый удар:
//! 1. отказ если мёртв / умирает / неуязвим
//! 2. health -= amount, окно неуязвимости
//! 3. прыжок в процессе? отменяем, knockback наследует вертикальную скорость
//! 4. knockback, агент отцеплен от navmesh
//! 5. hit cue (скорость под длительность knockback'а)
//! 6. health ≤ 0 → Death + DeathSequence

use bevy::prelude::*;

use crate::ai::MonsterState;
use crate::combat::{DamageRequest, DamageResolved};
use crate::components::{Health, HitOutcome, Monster, MonsterStats, MotionAuthority, NavAgent};
use crate::death::{DeathSequence, DeathStarted};
use crate::jump::JumpController;
use crate::knockback::Knockback;
use crate::presentation::{CueTimings, MonsterCue, PresentationCue};

/// Всё, что меняет один удар (borrowed из query)
pub struct DamageTarget<'a> {
    pub monster: &'a mut Monster,
    pub state: &'a mut MonsterState,
    pub health: &'a mut Health,
    pub jump: &'a mut JumpController,
    pub knockback: &'a mut Knockback,
    pub agent: &'a mut NavAgent,
    pub authority: &'a mut MotionAuthority,
    pub transform: &'a Transform,
    pub stats: &'a MonsterStats,
}

/// Применяет удар. `None` = отклонён, ничего не изменилось.
///
/// Смерть только помечается (state + `dying`); DeathSequence вешает система.
pub fn apply_damage(target: DamageTarget, amount: f32, source_position: Vec3) -> Option<HitOutcome> {
    let DamageTarget {
        monster,
        state,
        health,
        jump,
        knockback,
        agent,
        authority,
        transform,
        stats,
    } = target;

    let outcome = monster.try_accept_hit(state, health, amount, stats.invincibility_duration)?;

    // Отмена прыжка до старта knockback'а (вертикаль переходит в airborne knockback)
    let inherited_vertical = jump.cancel();
    knockback.start(transform, source_position, stats.knockback_force, inherited_vertical);

    *authority = MotionAuthority::Knockback;
    agent.detach();
    monster.invalidate_destination();

    if outcome.lethal && monster.begin_death() {
        *state = MonsterState::Death;
    }

    Some(outcome)
}

/// Система: обработка DamageRequest событий
pub fn process_damage_requests(
    mut commands: Commands,
    mut requests: EventReader<DamageRequest>,
    mut monsters: Query<(
        &mut Monster,
        &mut MonsterState,
        &mut Health,
        &mut JumpController,
        &mut Knockback,
        &mut NavAgent,
        &mut MotionAuthority,
        &Transform,
        &MonsterStats,
        &CueTimings,
    )>,
    mut resolved_events: EventWriter<DamageResolved>,
    mut cue_events: EventWriter<PresentationCue>,
    mut death_events: EventWriter<DeathStarted>,
) {
    for request in requests.read() {
        let Ok((
            mut monster,
            mut state,
            mut health,
            mut jump,
            mut knockback,
            mut agent,
            mut authority,
            transform,
            stats,
            timings,
        )) = monsters.get_mut(request.target)
        else {
            crate::logger::log_warning(&format!(
                "⚠️ DamageRequest: {:?} is not a monster",
                request.target
            ));
            resolved_events.write(DamageResolved {
                target: request.target,
                accepted: false,
                lethal: false,
            });
            continue;
        };

        let target = DamageTarget {
            monster: &mut monster,
            state: &mut state,
            health: &mut health,
            jump: &mut jump,
            knockback: &mut knockback,
            agent: &mut agent,
            authority: &mut authority,
            transform,
            stats,
        };

        let Some(outcome) = apply_damage(target, request.amount, request.source_position) else {
            resolved_events.write(DamageResolved {
                target: request.target,
                accepted: false,
                lethal: false,
            });
            continue;
        };

        crate::logger::log(&format!(
            "💥 {:?} took {:.1} damage (health {:.1}/{:.1})",
            request.target, request.amount, outcome.remaining_health, health.max
        ));

        cue_events.write(PresentationCue {
            entity: request.target,
            cue: MonsterCue::Hit {
                playback_speed: timings.hit_playback_speed(stats.knockback_duration),
            },
        });

        if outcome.lethal {
            crate::logger::log(&format!("💀 {:?} killed, death sequence started", request.target));
            commands.entity(request.target).insert(DeathSequence::default());
            death_events.write(DeathStarted {
                entity: request.target,
                position: transform.translation,
            });
        }

        resolved_events.write(DamageResolved {
            target: request.target,
            accepted: true,
            lethal: outcome.lethal,
        });
    }
}

/// Система: таймеры, которые тикают независимо от состояния
/// (invincibility window, jump cooldown)
pub fn tick_monster_timers(mut monsters: Query<(&mut Monster, &mut JumpController)>, time: Res<Time<Fixed>>) {
    let delta = time.delta_secs();

    for (mut monster, mut jump) in monsters.iter_mut() {
        monster.tick_invincibility(delta);
        jump.tick_cooldown(delta);
    }
}
