//! Monster integration test
//!
//! Полный App (SimulationPlugin + headless follower + PlatformWorld),
//! каждый `update()` = ровно один fixed tick.
//!
//! Проверяем:
//! - Преследование → атака
//! - Удар → knockback → Patrol
//! - Смерть → лут → удаление
//! - Прыжок на уступ, до которого нет пути

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::time::Duration;

use monster_simulation::ai::{JumpStarted, KnockbackCompleted};
use monster_simulation::death::DeathStarted;
use monster_simulation::navigation::Platform;
use monster_simulation::*;

/// Helper: App с миром и фиксированным шагом времени
fn create_monster_app(seed: u64, world: PlatformWorld) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(HeadlessNavigationPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / SIMULATION_HZ,
        )));
    insert_world(&mut app, world);
    app
}

fn flat_world() -> PlatformWorld {
    PlatformWorld::new().with_platform(Platform::new(
        Vec2::new(-30.0, -30.0),
        Vec2::new(30.0, 30.0),
        0.0,
        0,
    ))
}

/// Земля до x=0, уступ +2м с x=3 (отдельный регион, пешком не дойти)
fn ledge_world() -> PlatformWorld {
    PlatformWorld::new()
        .with_platform(Platform::new(Vec2::new(-20.0, -5.0), Vec2::new(0.0, 5.0), 0.0, 0))
        .with_platform(Platform::new(Vec2::new(3.0, -5.0), Vec2::new(13.0, 5.0), 2.0, 1).with_thickness(2.0))
}

fn drain<E: Event + Clone>(app: &App) -> Vec<E> {
    app.world()
        .resource::<Events<E>>()
        .iter_current_update_events()
        .cloned()
        .collect()
}

fn spawn_target(app: &mut App, position: Vec3) -> Entity {
    app.world_mut().spawn(Transform::from_translation(position)).id()
}

fn spawn_monster(app: &mut App, stats: MonsterStats, position: Vec3, target: Option<Entity>) -> Entity {
    app.world_mut().spawn(monster_bundle(stats, position, target)).id()
}

fn send_damage(app: &mut App, target: Entity, amount: f32, source_position: Vec3) {
    app.world_mut().send_event(DamageRequest {
        target,
        amount,
        source_position,
    });
}

/// Test: монстр видит цель, догоняет и атакует
#[test]
fn test_monster_chases_and_attacks() {
    let mut app = create_monster_app(42, flat_world());
    let target = spawn_target(&mut app, Vec3::new(6.0, 0.0, 0.0));
    let monster = spawn_monster(&mut app, MonsterStats::default(), Vec3::ZERO, Some(target));

    let mut attacks = Vec::new();
    let mut cues = Vec::new();

    for _ in 0..400 {
        app.update();
        attacks.extend(drain::<MonsterAttack>(&app));
        cues.extend(drain::<PresentationCue>(&app).into_iter().map(|cue| cue.cue));
    }

    assert_eq!(app.world().get::<MonsterState>(monster), Some(&MonsterState::Attack));
    assert!(cues.contains(&MonsterCue::IdleToTrace));
    assert!(cues.contains(&MonsterCue::TraceToAttack));

    // 4.5м при 3.5м/с ≈ 1.3с, затем атака каждые 1.5с
    assert!(!attacks.is_empty(), "no attacks in 400 ticks");
    assert!(attacks.iter().all(|attack| attack.attacker == monster && attack.target == target));
    assert!(attacks.iter().all(|attack| attack.damage == MonsterStats::default().damage));

    let position = app.world().get::<Transform>(monster).map(|t| t.translation);
    let distance = position.map(|p| p.distance(Vec3::new(6.0, 0.0, 0.0)));
    assert!(distance.is_some_and(|d| d <= 1.5 + 1e-3), "distance = {:?}", distance);
}

/// Test: удар отбрасывает, после knockback'а монстр патрулирует
#[test]
fn test_hit_knocks_back_then_patrols() {
    let mut app = create_monster_app(7, flat_world());
    let monster = spawn_monster(&mut app, MonsterStats::default(), Vec3::ZERO, None);

    app.update();
    send_damage(&mut app, monster, 10.0, Vec3::new(-1.0, 0.0, 0.0));
    app.update();

    let resolved = drain::<DamageResolved>(&app);
    assert_eq!(resolved.len(), 1);
    assert!(resolved[0].accepted);
    assert_eq!(
        app.world().get::<MotionAuthority>(monster),
        Some(&MotionAuthority::Knockback)
    );
    assert_eq!(app.world().get::<Health>(monster).map(|h| h.current), Some(90.0));

    // Повторный удар в том же окне неуязвимости
    send_damage(&mut app, monster, 10.0, Vec3::new(-1.0, 0.0, 0.0));
    app.update();
    let resolved = drain::<DamageResolved>(&app);
    assert_eq!(resolved.len(), 1);
    assert!(!resolved[0].accepted);

    // knockback_duration 0.3с = 18 тиков
    let mut completions = Vec::new();
    for _ in 0..40 {
        app.update();
        completions.extend(drain::<KnockbackCompleted>(&app));
    }

    assert_eq!(completions.len(), 1);
    assert!(
        completions[0].resting.x > 0.3,
        "pushed away from the source, got {:?}",
        completions[0].resting
    );

    let world = app.world();
    assert_eq!(world.get::<MotionAuthority>(monster), Some(&MotionAuthority::Navigated));
    assert!(matches!(world.get::<MonsterState>(monster), Some(MonsterState::Patrol { .. })));
    assert!(world.get::<Knockback>(monster).is_some_and(|k| !k.is_active()));
    assert_eq!(world.get::<Health>(monster).map(|h| h.current), Some(90.0));
}

/// Test: смертельный удар → лут → удаление
#[test]
fn test_death_drops_loot_and_removes_monster() {
    let mut app = create_monster_app(3, flat_world());
    let stats = MonsterStats {
        max_health: 20.0,
        loot: LootTable {
            drop_chance: 1.0,
            count_min: 3,
            count_max: 3,
            ..Default::default()
        },
        ..Default::default()
    };
    let monster = spawn_monster(&mut app, stats, Vec3::new(2.0, 0.0, 2.0), None);

    app.update();
    send_damage(&mut app, monster, 50.0, Vec3::new(2.0, 0.0, 0.0));

    let mut started = Vec::new();
    let mut loot = Vec::new();
    let mut removed = Vec::new();
    let mut cues = Vec::new();
    let mut late_hits = Vec::new();

    for tick in 0..500 {
        if tick == 5 {
            send_damage(&mut app, monster, 5.0, Vec3::ZERO);
        }
        app.update();

        started.extend(drain::<DeathStarted>(&app));
        loot.extend(drain::<LootDropRequested>(&app));
        removed.extend(drain::<MonsterRemoved>(&app));
        cues.extend(
            drain::<PresentationCue>(&app)
                .into_iter()
                .filter(|cue| cue.entity == monster)
                .map(|cue| cue.cue),
        );
        if tick == 5 {
            late_hits.extend(drain::<DamageResolved>(&app));
        }
    }

    assert_eq!(started.len(), 1);
    assert_eq!(late_hits.len(), 1);
    assert!(!late_hits[0].accepted, "dying monster must reject damage");

    assert!(matches!(cues.first(), Some(MonsterCue::Hit { .. })));
    assert_eq!(cues.iter().filter(|cue| **cue == MonsterCue::Death).count(), 1);

    assert_eq!(loot.len(), 3);
    let indices: Vec<u32> = loot.iter().map(|item| item.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert!(loot.iter().all(|item| item.total == 3 && (item.position.y - 1.5).abs() < 1e-3));

    assert_eq!(removed.len(), 1);
    assert!(app.world().get_entity(monster).is_err());
}

/// Test: пути на уступ нет — монстр идёт к краю, прыгает и догоняет
#[test]
fn test_monster_jumps_onto_unreachable_ledge() {
    let mut app = create_monster_app(11, ledge_world());
    let target_position = Vec3::new(6.0, 2.0, 0.0);
    let target = spawn_target(&mut app, target_position);
    let monster = spawn_monster(&mut app, MonsterStats::default(), Vec3::new(-3.0, 0.0, 0.0), Some(target));

    let mut jumps = Vec::new();
    let mut cues = Vec::new();
    let mut saw_ballistic = false;

    for _ in 0..600 {
        app.update();
        jumps.extend(drain::<JumpStarted>(&app));
        cues.extend(drain::<PresentationCue>(&app).into_iter().map(|cue| cue.cue));
        saw_ballistic |= app.world().get::<MotionAuthority>(monster) == Some(&MotionAuthority::Ballistic);
    }

    assert!(!jumps.is_empty(), "monster never jumped");
    assert!(saw_ballistic);
    assert!(cues.iter().any(|cue| matches!(cue, MonsterCue::TraceToJump { .. })));
    assert!(cues.contains(&MonsterCue::JumpLanded));

    let position = app
        .world()
        .get::<Transform>(monster)
        .map(|t| t.translation)
        .unwrap_or_default();
    assert!((position.y - 2.0).abs() < 0.05, "monster should stand on the ledge: {:?}", position);
    assert!(position.x >= 3.0);
    assert_eq!(app.world().get::<MonsterState>(monster), Some(&MonsterState::Attack));
}
