//! MonsterController FSM (Idle / Patrol / Trace / Attack / Comeback).
//!
//! Jump и Death ведут свои подсистемы, knockback подвешивает FSM целиком.
//! Логика тика — чистая функция `think` (тестируется без App),
//! система `monster_fsm` только собирает входы и пишет события.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::patrol::{sample_patrol_point, PATROL_ARRIVAL_THRESHOLD};
use crate::ai::{JumpStarted, MonsterState, PatrolPhase};
use crate::combat::MonsterAttack;
use crate::components::{Monster, MonsterStats, MotionAuthority, NavAgent};
use crate::jump::{JumpContext, JumpController, JumpPlan};
use crate::knockback::Knockback;
use crate::navigation::{horizontal_distance, PathStatus, WorldNavigation, WorldPhysics, WorldView};
use crate::presentation::{MonsterCue, PresentationCue};
use crate::DeterministicRng;

/// Новый destination коммитится только если сдвинулся больше этого
pub const DESTINATION_REISSUE_THRESHOLD: f32 = 1.0;
/// Дистанция до home, на которой Comeback считается завершённым
pub const COMEBACK_ARRIVAL_THRESHOLD: f32 = 0.5;
/// Stopping distance при подходе к краю mesh'а (staging point перед прыжком)
const EDGE_STOPPING_DISTANCE: f32 = 0.1;

/// Изменяемое состояние монстра на один тик
pub struct Brain<'a> {
    pub monster: &'a mut Monster,
    pub state: &'a mut MonsterState,
    pub agent: &'a mut NavAgent,
    pub jump: &'a mut JumpController,
}

/// Что монстр "видит" в этом тике
pub struct Senses<'a> {
    pub position: Vec3,
    pub forward: Vec3,
    /// `None` = цели нет (не назначена или despawn'ута)
    pub target: Option<Vec3>,
    pub stats: &'a MonsterStats,
    pub world: WorldView<'a>,
}

/// Побочные эффекты тика (система превращает их в события)
#[derive(Debug, Default)]
pub struct Decision {
    pub cues: Vec<MonsterCue>,
    /// Атака по цели в этом тике
    pub attack: bool,
    /// JumpPlanner стартовал прыжок
    pub jump: Option<JumpPlan>,
}

/// Один тик FSM
pub fn think<R: Rng + ?Sized>(mut brain: Brain, senses: &Senses, rng: &mut R, delta: f32) -> Decision {
    let mut decision = Decision::default();
    let stats = senses.stats;
    let distance = senses.target.map(|target| senses.position.distance(target));
    let detected = distance.is_some_and(|d| d <= stats.detect_distance);

    match *brain.state {
        MonsterState::Idle => {
            if detected {
                enter_trace(&mut brain, stats, MonsterCue::IdleToTrace, &mut decision);
            }
        }

        MonsterState::Patrol { phase } => {
            if detected {
                enter_trace(&mut brain, stats, MonsterCue::PatrolToTrace, &mut decision);
            } else {
                let phase = patrol(&mut brain, senses, phase, rng, delta);
                *brain.state = MonsterState::Patrol { phase };
            }
        }

        MonsterState::Trace => match (senses.target, distance) {
            (Some(_), Some(distance)) if distance <= stats.attack_distance => {
                transition(&mut brain, MonsterState::Attack, MonsterCue::TraceToAttack, &mut decision);
                brain.agent.reset_path();
            }
            (Some(target), Some(distance)) if distance < stats.detect_distance => {
                trace(&mut brain, senses, target, &mut decision, delta);
            }
            _ => {
                transition(&mut brain, MonsterState::Comeback, MonsterCue::TraceToComeback, &mut decision);
                brain.agent.speed = stats.move_speed;
                brain.agent.stopping_distance = 0.0;
            }
        },

        MonsterState::Attack => match distance {
            Some(distance) if distance <= stats.attack_distance => {
                brain.monster.attack_timer += delta;
                if brain.monster.attack_timer >= stats.attack_speed {
                    brain.monster.attack_timer = 0.0;
                    decision.attack = true;
                    decision.cues.push(MonsterCue::Attack);
                }
            }
            _ => enter_trace(&mut brain, stats, MonsterCue::AttackToTrace, &mut decision),
        },

        MonsterState::Comeback => {
            if detected {
                enter_trace(&mut brain, stats, MonsterCue::ComebackToTrace, &mut decision);
            } else if horizontal_distance(senses.position, brain.monster.home) < COMEBACK_ARRIVAL_THRESHOLD {
                let next = MonsterState::Patrol {
                    phase: PatrolPhase::Waiting {
                        remaining: stats.patrol_wait_time,
                    },
                };
                transition(&mut brain, next, MonsterCue::ComebackToPatrol, &mut decision);
                brain.agent.reset_path();
            } else {
                let home = brain.monster.home;
                if brain.monster.destination != Some(home) || brain.agent.destination.is_none() {
                    brain.monster.destination = Some(home);
                    brain.agent.set_destination(home);
                }
            }
        }

        // Ведут JumpExecutor / DeathSequence
        MonsterState::Jump | MonsterState::Death => {}
    }

    decision
}

fn transition(brain: &mut Brain, next: MonsterState, cue: MonsterCue, decision: &mut Decision) {
    crate::logger::log(&format!("🔄 FSM: {:?} → {:?}", brain.state, next));
    *brain.state = next;
    brain.monster.invalidate_destination();
    decision.cues.push(cue);
}

fn enter_trace(brain: &mut Brain, stats: &MonsterStats, cue: MonsterCue, decision: &mut Decision) {
    transition(brain, MonsterState::Trace, cue, decision);
    brain.agent.speed = stats.move_speed;
    brain.agent.stopping_distance = stats.attack_distance;
}

/// Trace: destination по приоритету + JumpPlanner
fn trace(brain: &mut Brain, senses: &Senses, target: Vec3, decision: &mut Decision, delta: f32) {
    let ctx = JumpContext {
        position: senses.position,
        forward: senses.forward,
        target,
        stats: senses.stats,
        world: senses.world,
    };

    if let Some((destination, approach_edge)) = trace_destination(brain.jump, &ctx) {
        let changed = brain
            .monster
            .destination
            .map_or(true, |cached| cached.distance(destination) > DESTINATION_REISSUE_THRESHOLD);

        if changed || brain.agent.destination.is_none() {
            brain.monster.destination = Some(destination);
            brain.agent.set_destination(destination);
        }

        brain.agent.stopping_distance = if approach_edge {
            EDGE_STOPPING_DISTANCE
        } else {
            senses.stats.attack_distance
        };
    }

    decision.jump = brain.jump.plan_during_trace(&ctx, delta);
}

/// Приоритет: прямой путь к цели → путь к проекции цели на землю →
/// край своего mesh'а в сторону цели. Второй элемент — "подход к краю".
fn trace_destination(jump: &JumpController, ctx: &JumpContext) -> Option<(Vec3, bool)> {
    // Без navmesh'а исполнитель сам разбирается с путём
    if !ctx.world.has_navigation() {
        return Some((ctx.target, false));
    }

    let reachable = |point: Vec3| {
        ctx.world
            .find_path(ctx.position, point)
            .is_some_and(|path| path.status == PathStatus::Complete)
    };

    if reachable(ctx.target) {
        return Some((ctx.target, false));
    }

    if let Some(ground) = jump.target_ground.filter(|ground| reachable(*ground)) {
        return Some((ground, false));
    }

    jump.own_mesh_edge(ctx).map(|edge| (edge, true))
}

/// Patrol: идём к точке → ждём → новая точка
fn patrol<R: Rng + ?Sized>(
    brain: &mut Brain,
    senses: &Senses,
    phase: PatrolPhase,
    rng: &mut R,
    delta: f32,
) -> PatrolPhase {
    let stats = senses.stats;

    match phase {
        PatrolPhase::Moving { point } => {
            // Агента сбросили (reattach после warp) — идём заново
            if brain.agent.destination.is_none() {
                brain.agent.set_destination(point);
            }

            if brain.agent.has_arrived(PATROL_ARRIVAL_THRESHOLD) {
                brain.agent.reset_path();
                PatrolPhase::Waiting {
                    remaining: stats.patrol_wait_time,
                }
            } else {
                phase
            }
        }
        PatrolPhase::Waiting { remaining } => {
            let remaining = remaining - delta;
            if remaining > 0.0 {
                return PatrolPhase::Waiting { remaining };
            }

            let point = sample_patrol_point(
                &senses.world,
                brain.monster.home,
                senses.position,
                stats.patrol_radius,
                rng,
            );
            brain.agent.speed = stats.patrol_speed;
            brain.agent.stopping_distance = 0.0;
            brain.agent.set_destination(point);
            brain.monster.destination = Some(point);
            PatrolPhase::Moving { point }
        }
    }
}

/// Система: FSM тик для всех монстров под навигацией
pub fn monster_fsm(
    mut monsters: Query<(
        Entity,
        &mut Monster,
        &mut MonsterState,
        &mut NavAgent,
        &mut JumpController,
        &MonsterStats,
        &MotionAuthority,
        &Knockback,
        &Transform,
    )>,
    targets: Query<&Transform, Without<Monster>>,
    navigation: Option<Res<WorldNavigation>>,
    physics: Option<Res<WorldPhysics>>,
    mut rng: ResMut<DeterministicRng>,
    mut cue_events: EventWriter<PresentationCue>,
    mut attack_events: EventWriter<MonsterAttack>,
    mut jump_events: EventWriter<JumpStarted>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();
    let world = WorldView::new(navigation.as_deref(), physics.as_deref());

    for (entity, mut monster, mut state, mut agent, mut jump, stats, authority, knockback, transform) in
        monsters.iter_mut()
    {
        // Knockback / ballistic / смерть — FSM спит
        if *authority != MotionAuthority::Navigated || knockback.is_active() || !state.is_fsm_driven() {
            continue;
        }

        let target_entity = monster.target;
        let target = target_entity.and_then(|target| targets.get(target).ok().map(|t| t.translation));

        let senses = Senses {
            position: transform.translation,
            forward: transform.forward().as_vec3(),
            target,
            stats,
            world,
        };
        let brain = Brain {
            monster: &mut monster,
            state: &mut state,
            agent: &mut agent,
            jump: &mut jump,
        };

        let decision = think(brain, &senses, &mut rng.rng, delta);

        for cue in decision.cues {
            cue_events.write(PresentationCue { entity, cue });
        }

        if decision.attack {
            if let (Some(target_entity), Some(hit_point)) = (target_entity, target) {
                crate::logger::log(&format!("⚔️ {:?} attacks {:?}", entity, target_entity));
                attack_events.write(MonsterAttack {
                    attacker: entity,
                    target: target_entity,
                    damage: stats.damage,
                    hit_point,
                });
            }
        }

        if let Some(plan) = decision.jump {
            jump_events.write(JumpStarted {
                entity,
                kind: plan.kind,
                landing: plan.landing,
                flight_time: plan.flight_time,
            });
        }
    }
}
