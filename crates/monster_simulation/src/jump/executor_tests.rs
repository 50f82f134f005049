//! Tests for jump execution (ballistics, landing, cancel).

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use proptest::prelude::*;

    use crate::components::MonsterStats;
    use crate::jump::{JumpContext, JumpController, JumpLanding, JumpPhase, JumpSession, JUMP_FAIL_COOLDOWN};
    use crate::navigation::{NavigationOracle, Platform, PlatformWorld, WorldView};

    const DT: f32 = 1.0 / 60.0;

    fn session(start: Vec3, velocity: Vec3, target_height: f32) -> JumpSession {
        JumpSession {
            start,
            landing: start,
            velocity,
            target_height,
            phase: JumpPhase::Airborne,
            flight_time: 1.0,
        }
    }

    /// Гоняет прыжок до посадки (или до лимита тиков)
    fn run_until_landed(
        controller: &mut JumpController,
        transform: &mut Transform,
        world: &WorldView,
        max_ticks: usize,
    ) -> Option<(JumpLanding, usize)> {
        for tick in 0..max_ticks {
            if let Some(landing) = controller.advance(transform, world, DT) {
                return Some((landing, tick));
            }
        }
        None
    }

    #[test]
    fn test_upward_jump_lands_on_ledge() {
        let stats = MonsterStats::default();
        let world = PlatformWorld::new()
            .with_platform(Platform::new(Vec2::new(-20.0, -5.0), Vec2::new(0.0, 5.0), 0.0, 0))
            .with_platform(Platform::new(Vec2::new(3.0, -5.0), Vec2::new(13.0, 5.0), 2.0, 1).with_thickness(2.0));
        let (nav, phys) = world.into_resources();
        let view = WorldView::new(Some(&nav), Some(&phys));

        let target = Vec3::new(6.0, 2.0, 0.0);
        let ctx = JumpContext {
            position: Vec3::ZERO,
            forward: Vec3::X,
            target,
            stats: &stats,
            world: view,
        };
        let mut controller = JumpController::default();
        controller.refresh_target_ground(&view, target, 0.0);
        controller.try_start(&ctx).expect("jump should start");

        let mut transform = Transform::IDENTITY;
        let (landing, ticks) =
            run_until_landed(&mut controller, &mut transform, &view, 600).expect("jump must land");

        assert!(!landing.forced);
        assert!(!landing.retry_immediately);
        assert!((landing.resting.y - 2.0).abs() < 1e-3, "resting = {:?}", landing.resting);
        assert!(landing.resting.x >= 3.0 - 1e-3);
        assert_eq!(transform.translation, landing.resting);
        assert!(ticks < 120);
        assert!(!controller.is_jumping());
        assert_eq!(controller.stuck_timer, 0.0);
    }

    #[test]
    fn test_safety_valve_forces_landing_at_takeoff() {
        // Крошечная платформа и пустота вокруг
        let world = PlatformWorld::new().with_platform(Platform::new(Vec2::splat(-1.0), Vec2::splat(1.0), 0.0, 0));
        let (nav, phys) = world.into_resources();
        let view = WorldView::new(Some(&nav), Some(&phys));

        let mut controller = JumpController::default();
        controller.session = Some(session(Vec3::ZERO, Vec3::new(5.0, 10.0, 0.0), -3.0));

        let mut transform = Transform::IDENTITY;
        let (landing, _) = run_until_landed(&mut controller, &mut transform, &view, 1000).expect("must terminate");

        assert!(landing.forced);
        assert_eq!(landing.resting, Vec3::ZERO);
        assert_eq!(controller.cooldown, JUMP_FAIL_COOLDOWN);
        assert!(nav.0.sample_walkable(landing.resting, 0.01).is_some());
    }

    #[test]
    fn test_cancel_returns_vertical_velocity() {
        let mut controller = JumpController::default();
        controller.session = Some(session(Vec3::ZERO, Vec3::new(5.0, 4.0, 0.0), 0.0));

        assert_eq!(controller.cancel(), Some(4.0));
        assert!(!controller.is_jumping());
        assert_eq!(controller.cancel(), None);
    }

    #[test]
    fn test_cancel_during_windup_has_no_vertical_velocity() {
        let mut controller = JumpController::default();
        let mut preparing = session(Vec3::ZERO, Vec3::new(5.0, 10.0, 0.0), 0.0);
        preparing.phase = JumpPhase::Preparing { remaining: 0.3 };
        controller.session = Some(preparing);

        assert_eq!(controller.cancel(), None);
        assert!(!controller.is_jumping());
    }

    #[test]
    fn test_windup_holds_position_then_launches() {
        let world = PlatformWorld::new().with_platform(Platform::new(Vec2::splat(-20.0), Vec2::splat(20.0), 0.0, 0));
        let (nav, phys) = world.into_resources();
        let view = WorldView::new(Some(&nav), Some(&phys));

        let mut controller = JumpController::default();
        let mut preparing = session(Vec3::ZERO, Vec3::new(5.0, 10.0, 0.0), 0.0);
        preparing.phase = JumpPhase::Preparing { remaining: 0.1 };
        controller.session = Some(preparing);

        let mut transform = Transform::IDENTITY;
        for _ in 0..5 {
            assert!(controller.advance(&mut transform, &view, DT).is_none());
            assert_eq!(transform.translation, Vec3::ZERO);
        }

        // Windup кончился — через пару тиков уже в воздухе
        for _ in 0..3 {
            controller.advance(&mut transform, &view, DT);
        }
        assert!(transform.translation.y > 0.0);
    }

    #[test]
    fn test_landing_too_high_allows_bounded_immediate_retries() {
        let world = PlatformWorld::new().with_platform(Platform::new(Vec2::splat(-20.0), Vec2::splat(20.0), 0.0, 0));
        let (nav, phys) = world.into_resources();
        let view = WorldView::new(Some(&nav), Some(&phys));

        let mut controller = JumpController::default();
        let mut retries = Vec::new();

        for _ in 0..3 {
            controller.cooldown = 1.5;
            // Цель на -2, а садимся на 0 → "слишком высоко"
            controller.session = Some(session(Vec3::new(0.0, 0.3, 0.0), Vec3::new(0.0, -1.0, 0.0), -2.0));
            let mut transform = Transform::from_xyz(0.0, 0.3, 0.0);
            let (landing, _) = run_until_landed(&mut controller, &mut transform, &view, 60).expect("lands");
            retries.push((landing.retry_immediately, controller.cooldown));
        }

        assert_eq!(retries[0], (true, 0.0));
        assert_eq!(retries[1], (true, 0.0));
        assert_eq!(retries[2], (false, 1.5));
        assert_eq!(controller.immediate_retries, 0);
    }

    proptest! {
        #[test]
        fn prop_jump_always_terminates_on_walkable_ground(
            vx in -8.0f32..8.0,
            vz in -8.0f32..8.0,
            vy in -5.0f32..15.0,
        ) {
            let world = PlatformWorld::new()
                .with_platform(Platform::new(Vec2::splat(-200.0), Vec2::splat(200.0), 0.0, 0));
            let (nav, phys) = world.into_resources();
            let view = WorldView::new(Some(&nav), Some(&phys));

            let mut controller = JumpController::default();
            controller.session = Some(session(Vec3::ZERO, Vec3::new(vx, vy, vz), 0.0));

            let mut transform = Transform::IDENTITY;
            let landed = run_until_landed(&mut controller, &mut transform, &view, 2000);

            prop_assert!(landed.is_some());
            let (landing, _) = landed.unwrap();
            prop_assert!(nav.0.sample_walkable(landing.resting, 0.01).is_some());
            prop_assert!(!controller.is_jumping());
        }
    }
}
