//! Motion authority handoff: knockback / jump исполнение и возврат к FSM.
//!
//! Порядок в тике: update_knockback → update_jumps → apply_motion_completions
//! → (monster_fsm) → apply_jump_starts.

use bevy::prelude::*;

use crate::ai::{JumpCompleted, JumpStarted, KnockbackCompleted, MonsterState};
use crate::components::{Monster, MonsterStats, MotionAuthority, NavAgent};
use crate::jump::JumpController;
use crate::knockback::Knockback;
use crate::navigation::{WorldNavigation, WorldPhysics, WorldView};
use crate::presentation::{CueTimings, MonsterCue, PresentationCue};

/// Система: KnockbackController тик
///
/// По завершении: агент снова под навигацией, stuck detection сброшен.
pub fn update_knockback(
    mut monsters: Query<(
        Entity,
        &mut Transform,
        &mut Knockback,
        &mut NavAgent,
        &mut MotionAuthority,
        &mut JumpController,
        &Monster,
        &MonsterStats,
    )>,
    navigation: Option<Res<WorldNavigation>>,
    physics: Option<Res<WorldPhysics>>,
    mut completed_events: EventWriter<KnockbackCompleted>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    let world = WorldView::new(navigation.as_deref(), physics.as_deref());

    for (entity, mut transform, mut knockback, mut agent, mut authority, mut jump, monster, stats) in
        monsters.iter_mut()
    {
        if !knockback.is_active() {
            continue;
        }

        let Some(completion) = knockback.advance(&mut transform, &world, stats, monster.home, delta) else {
            continue;
        };

        *authority = MotionAuthority::Navigated;
        agent.reattach();
        jump.reset_stuck(completion.resting);

        crate::logger::log(&format!(
            "🛬 Knockback finished for {:?} ({:?}) at {:?}",
            entity, completion.reason, completion.resting
        ));

        completed_events.write(KnockbackCompleted {
            entity,
            resting: completion.resting,
            reason: completion.reason,
        });
    }
}

/// Система: JumpExecutor тик (только под `MotionAuthority::Ballistic`)
pub fn update_jumps(
    mut monsters: Query<(
        Entity,
        &mut Transform,
        &mut JumpController,
        &mut NavAgent,
        &mut MotionAuthority,
    )>,
    navigation: Option<Res<WorldNavigation>>,
    physics: Option<Res<WorldPhysics>>,
    mut completed_events: EventWriter<JumpCompleted>,
    mut cue_events: EventWriter<PresentationCue>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    let world = WorldView::new(navigation.as_deref(), physics.as_deref());

    for (entity, mut transform, mut jump, mut agent, mut authority) in monsters.iter_mut() {
        if *authority != MotionAuthority::Ballistic {
            continue;
        }

        // Сессию отменили (не через damage) — отдаём позицию обратно
        if !jump.is_jumping() {
            crate::logger::log_warning(&format!(
                "⚠️ {:?} is ballistic without a jump session, returning to navigation",
                entity
            ));
            *authority = MotionAuthority::Navigated;
            agent.reattach();
            continue;
        }

        let Some(landing) = jump.advance(&mut transform, &world, delta) else {
            continue;
        };

        *authority = MotionAuthority::Navigated;
        agent.reattach();

        crate::logger::log(&format!(
            "🦶 {:?} landed at {:?} (forced: {}, retry: {})",
            entity, landing.resting, landing.forced, landing.retry_immediately
        ));

        cue_events.write(PresentationCue {
            entity,
            cue: MonsterCue::JumpLanded,
        });
        completed_events.write(JumpCompleted { entity, landing });
    }
}

/// Система: completion события → канонические состояния
///
/// Jump → Trace; Knockback → Patrol (никогда не в прерванное состояние).
pub fn apply_motion_completions(
    mut monsters: Query<(&mut Monster, &mut MonsterState)>,
    mut jump_events: EventReader<JumpCompleted>,
    mut knockback_events: EventReader<KnockbackCompleted>,
) {
    for event in jump_events.read() {
        let Ok((mut monster, mut state)) = monsters.get_mut(event.entity) else {
            continue;
        };

        if *state == MonsterState::Jump {
            *state = MonsterState::Trace;
            monster.invalidate_destination();
        }
    }

    for event in knockback_events.read() {
        let Ok((mut monster, mut state)) = monsters.get_mut(event.entity) else {
            continue;
        };

        if state.is_dead() {
            continue;
        }

        crate::logger::log(&format!("🔄 FSM: {:?} → Patrol (after knockback)", *state));
        *state = MonsterState::patrol();
        monster.invalidate_destination();
    }
}

/// Система: JumpStarted → Jump state, ballistic authority, TraceToJump cue
pub fn apply_jump_starts(
    mut monsters: Query<(
        &mut Monster,
        &mut MonsterState,
        &mut NavAgent,
        &mut MotionAuthority,
        &JumpController,
        &CueTimings,
    )>,
    mut jump_events: EventReader<JumpStarted>,
    mut cue_events: EventWriter<PresentationCue>,
) {
    for event in jump_events.read() {
        let Ok((mut monster, mut state, mut agent, mut authority, jump, timings)) = monsters.get_mut(event.entity)
        else {
            continue;
        };

        if *state != MonsterState::Trace || !jump.is_jumping() {
            continue;
        }

        *state = MonsterState::Jump;
        monster.invalidate_destination();
        agent.detach();
        *authority = MotionAuthority::Ballistic;

        cue_events.write(PresentationCue {
            entity: event.entity,
            cue: MonsterCue::TraceToJump {
                playback_speed: timings.jump_playback_speed(event.flight_time),
            },
        });
    }
}
