//! Tests for the monster FSM tick.

#[cfg(test)]
mod tests {
    use super::super::fsm::{think, Brain, Decision, Senses, COMEBACK_ARRIVAL_THRESHOLD};
    use crate::ai::{MonsterState, PatrolPhase};
    use crate::components::{Monster, MonsterStats, NavAgent};
    use crate::jump::JumpController;
    use crate::navigation::{Platform, PlatformWorld, WorldNavigation, WorldPhysics, WorldView};
    use crate::presentation::MonsterCue;
    use bevy::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const DELTA: f32 = 0.5;

    struct Fixture {
        monster: Monster,
        state: MonsterState,
        agent: NavAgent,
        jump: JumpController,
        stats: MonsterStats,
        navigation: WorldNavigation,
        physics: WorldPhysics,
        rng: ChaCha8Rng,
    }

    impl Fixture {
        fn on(world: PlatformWorld, state: MonsterState) -> Self {
            let (navigation, physics) = world.into_resources();
            Self {
                monster: Monster::new(Vec3::ZERO),
                state,
                agent: NavAgent::default(),
                jump: JumpController::default(),
                stats: MonsterStats::default(),
                navigation,
                physics,
                rng: ChaCha8Rng::seed_from_u64(5),
            }
        }

        fn flat(state: MonsterState) -> Self {
            Self::on(flat_world(), state)
        }

        fn tick(&mut self, position: Vec3, target: Option<Vec3>) -> Decision {
            let senses = Senses {
                position,
                forward: Vec3::X,
                target,
                stats: &self.stats,
                world: WorldView::new(Some(&self.navigation), Some(&self.physics)),
            };
            let brain = Brain {
                monster: &mut self.monster,
                state: &mut self.state,
                agent: &mut self.agent,
                jump: &mut self.jump,
            };
            think(brain, &senses, &mut self.rng, DELTA)
        }
    }

    fn flat_world() -> PlatformWorld {
        PlatformWorld::new().with_platform(Platform::new(
            Vec2::new(-20.0, -20.0),
            Vec2::new(20.0, 20.0),
            0.0,
            0,
        ))
    }

    /// Низкая площадка x ∈ [-10, 1] и высокая x ∈ [4, 10] (+2м), не связаны
    fn ledge_world() -> PlatformWorld {
        PlatformWorld::new()
            .with_platform(Platform::new(Vec2::new(-10.0, -5.0), Vec2::new(1.0, 5.0), 0.0, 0))
            .with_platform(Platform::new(Vec2::new(4.0, -5.0), Vec2::new(10.0, 5.0), 2.0, 1))
    }

    #[test]
    fn test_idle_detects_target() {
        let mut fixture = Fixture::flat(MonsterState::Idle);

        let decision = fixture.tick(Vec3::ZERO, Some(Vec3::new(15.0, 0.0, 0.0)));
        assert_eq!(fixture.state, MonsterState::Idle);
        assert!(decision.cues.is_empty());

        let decision = fixture.tick(Vec3::ZERO, Some(Vec3::new(8.0, 0.0, 0.0)));
        assert_eq!(fixture.state, MonsterState::Trace);
        assert_eq!(decision.cues, vec![MonsterCue::IdleToTrace]);
        assert_eq!(fixture.agent.speed, fixture.stats.move_speed);
    }

    #[test]
    fn test_idle_without_target_stays_idle() {
        let mut fixture = Fixture::flat(MonsterState::Idle);
        fixture.tick(Vec3::ZERO, None);
        assert_eq!(fixture.state, MonsterState::Idle);
    }

    #[test]
    fn test_trace_commits_destination_with_reissue_threshold() {
        let mut fixture = Fixture::flat(MonsterState::Trace);

        fixture.tick(Vec3::ZERO, Some(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(fixture.agent.destination, Some(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(fixture.agent.stopping_distance, fixture.stats.attack_distance);

        // Сдвиг 0.5 — не переиздаём
        fixture.tick(Vec3::ZERO, Some(Vec3::new(5.5, 0.0, 0.0)));
        assert_eq!(fixture.agent.destination, Some(Vec3::new(5.0, 0.0, 0.0)));

        // Сдвиг 2.0 — переиздаём
        fixture.tick(Vec3::ZERO, Some(Vec3::new(7.0, 0.0, 0.0)));
        assert_eq!(fixture.agent.destination, Some(Vec3::new(7.0, 0.0, 0.0)));
        assert_eq!(fixture.state, MonsterState::Trace);
    }

    #[test]
    fn test_trace_approaches_own_edge_when_target_unreachable() {
        let mut fixture = Fixture::on(ledge_world(), MonsterState::Trace);

        fixture.tick(Vec3::new(-2.0, 0.0, 0.0), Some(Vec3::new(6.0, 2.0, 0.0)));

        let destination = fixture.agent.destination.expect("edge destination");
        assert!((destination.x - 1.0).abs() < 1e-3, "destination = {:?}", destination);
        assert!((fixture.agent.stopping_distance - 0.1).abs() < 1e-6);
        assert_eq!(fixture.state, MonsterState::Trace);
    }

    #[test]
    fn test_trace_to_attack_and_back() {
        let mut fixture = Fixture::flat(MonsterState::Trace);
        fixture.agent.set_destination(Vec3::new(1.0, 0.0, 0.0));

        let decision = fixture.tick(Vec3::ZERO, Some(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(fixture.state, MonsterState::Attack);
        assert_eq!(decision.cues, vec![MonsterCue::TraceToAttack]);
        assert!(fixture.agent.destination.is_none());

        let decision = fixture.tick(Vec3::ZERO, Some(Vec3::new(3.0, 0.0, 0.0)));
        assert_eq!(fixture.state, MonsterState::Trace);
        assert_eq!(decision.cues, vec![MonsterCue::AttackToTrace]);
    }

    #[test]
    fn test_attack_fires_on_cadence() {
        let mut fixture = Fixture::flat(MonsterState::Attack);
        let target = Some(Vec3::new(1.0, 0.0, 0.0));

        // attack_speed 1.5, тик 0.5 → третий тик
        assert!(!fixture.tick(Vec3::ZERO, target).attack);
        assert!(!fixture.tick(Vec3::ZERO, target).attack);

        let decision = fixture.tick(Vec3::ZERO, target);
        assert!(decision.attack);
        assert_eq!(decision.cues, vec![MonsterCue::Attack]);
        assert_eq!(fixture.monster.attack_timer, 0.0);

        assert!(!fixture.tick(Vec3::ZERO, target).attack);
    }

    #[test]
    fn test_trace_loses_target() {
        let mut fixture = Fixture::flat(MonsterState::Trace);

        let decision = fixture.tick(Vec3::ZERO, Some(Vec3::new(12.0, 0.0, 0.0)));
        assert_eq!(fixture.state, MonsterState::Comeback);
        assert_eq!(decision.cues, vec![MonsterCue::TraceToComeback]);

        let mut fixture = Fixture::flat(MonsterState::Trace);
        fixture.tick(Vec3::ZERO, None);
        assert_eq!(fixture.state, MonsterState::Comeback);
    }

    #[test]
    fn test_comeback_returns_home_then_patrols() {
        let mut fixture = Fixture::flat(MonsterState::Comeback);
        let far = Some(Vec3::new(30.0, 0.0, 0.0));

        fixture.tick(Vec3::new(5.0, 0.0, 0.0), far);
        assert_eq!(fixture.agent.destination, Some(Vec3::ZERO));
        assert_eq!(fixture.state, MonsterState::Comeback);

        let near_home = Vec3::new(COMEBACK_ARRIVAL_THRESHOLD * 0.5, 0.0, 0.0);
        let decision = fixture.tick(near_home, far);
        assert_eq!(decision.cues, vec![MonsterCue::ComebackToPatrol]);
        assert_eq!(
            fixture.state,
            MonsterState::Patrol {
                phase: PatrolPhase::Waiting {
                    remaining: fixture.stats.patrol_wait_time
                }
            }
        );
    }

    #[test]
    fn test_comeback_arrives_when_home_is_above_ground() {
        // Хост заспавнил монстра по центру капсулы: home на 1м выше navmesh
        let mut fixture = Fixture::flat(MonsterState::Comeback);
        fixture.monster.home = Vec3::new(0.0, 1.0, 0.0);
        let far = Some(Vec3::new(30.0, 0.0, 0.0));

        let decision = fixture.tick(Vec3::new(0.2, 0.0, 0.0), far);
        assert_eq!(decision.cues, vec![MonsterCue::ComebackToPatrol]);
        assert!(matches!(fixture.state, MonsterState::Patrol { .. }));
    }

    #[test]
    fn test_comeback_reacquires_target() {
        let mut fixture = Fixture::flat(MonsterState::Comeback);
        let decision = fixture.tick(Vec3::new(5.0, 0.0, 0.0), Some(Vec3::new(8.0, 0.0, 0.0)));
        assert_eq!(fixture.state, MonsterState::Trace);
        assert_eq!(decision.cues, vec![MonsterCue::ComebackToTrace]);
    }

    #[test]
    fn test_patrol_picks_point_then_waits_on_arrival() {
        let mut fixture = Fixture::flat(MonsterState::patrol());

        fixture.tick(Vec3::ZERO, None);
        let MonsterState::Patrol {
            phase: PatrolPhase::Moving { point },
        } = fixture.state
        else {
            panic!("expected moving patrol, got {:?}", fixture.state);
        };
        assert_eq!(fixture.agent.destination, Some(point));
        assert_eq!(fixture.agent.speed, fixture.stats.patrol_speed);

        // Follower доехал
        fixture.agent.remaining_distance = 0.1;
        fixture.tick(point, None);
        assert_eq!(
            fixture.state,
            MonsterState::Patrol {
                phase: PatrolPhase::Waiting {
                    remaining: fixture.stats.patrol_wait_time
                }
            }
        );

        // Ждём patrol_wait_time (2.0) = 4 тика по 0.5
        for _ in 0..3 {
            fixture.tick(point, None);
            assert!(matches!(
                fixture.state,
                MonsterState::Patrol {
                    phase: PatrolPhase::Waiting { .. }
                }
            ));
        }
        fixture.tick(point, None);
        assert!(matches!(
            fixture.state,
            MonsterState::Patrol {
                phase: PatrolPhase::Moving { .. }
            }
        ));
    }

    #[test]
    fn test_patrol_detects_target_mid_path() {
        let mut fixture = Fixture::flat(MonsterState::Patrol {
            phase: PatrolPhase::Moving {
                point: Vec3::new(4.0, 0.0, 0.0),
            },
        });

        let decision = fixture.tick(Vec3::ZERO, Some(Vec3::new(0.0, 0.0, 9.0)));
        assert_eq!(fixture.state, MonsterState::Trace);
        assert_eq!(decision.cues, vec![MonsterCue::PatrolToTrace]);
    }

    #[test]
    fn test_jump_and_death_are_not_driven_by_fsm() {
        for state in [MonsterState::Jump, MonsterState::Death] {
            let mut fixture = Fixture::flat(state);
            let decision = fixture.tick(Vec3::ZERO, Some(Vec3::new(1.0, 0.0, 0.0)));
            assert_eq!(fixture.state, state);
            assert!(decision.cues.is_empty());
            assert!(!decision.attack);
        }
    }
}
