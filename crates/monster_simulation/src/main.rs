//! Headless симуляция монстра
//!
//! Две площадки (нижняя и верхняя, +2м), монстр внизу, цель наверху.
//! Монстр подходит к краю, прыгает, догоняет и атакует; затем его убивают.

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use std::sync::Arc;
use std::time::Duration;

use monster_simulation::navigation::Platform;
use monster_simulation::presentation::{ClipTable, Clips, DEATH_CLIP, HIT_CLIP, JUMP_CLIP};
use monster_simulation::{
    create_headless_app, insert_world, log_info, monster_bundle, DamageRequest, HeadlessNavigationPlugin,
    LootDropRequested, MonsterAttack, MonsterRemoved, MonsterState, MonsterStats, PlatformWorld,
    SIMULATION_HZ,
};

const TICKS: u32 = 1200;
const KILL_TICK: u32 = 600;

fn main() {
    let seed = 42;
    let mut app = create_headless_app(seed);
    log_info(&format!("Starting headless monster simulation (seed: {})", seed));

    app.add_plugins(HeadlessNavigationPlugin)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
            1.0 / SIMULATION_HZ,
        )))
        .insert_resource(Clips(Arc::new(
            ClipTable::default()
                .with_clip(HIT_CLIP, 0.6)
                .with_clip(JUMP_CLIP, 0.8)
                .with_clip(DEATH_CLIP, 2.5),
        )));

    let world = PlatformWorld::new()
        .with_platform(Platform::new(Vec2::new(-10.0, -5.0), Vec2::new(1.0, 5.0), 0.0, 0))
        .with_platform(Platform::new(Vec2::new(3.0, -5.0), Vec2::new(10.0, 5.0), 2.0, 1));
    insert_world(&mut app, world);

    let target = app.world_mut().spawn(Transform::from_xyz(6.0, 2.0, 0.0)).id();
    let monster = app
        .world_mut()
        .spawn(monster_bundle(MonsterStats::default(), Vec3::new(-3.0, 0.0, 0.0), Some(target)))
        .id();

    for tick in 0..TICKS {
        if tick == KILL_TICK {
            app.world_mut().send_event(DamageRequest {
                target: monster,
                amount: 1000.0,
                source_position: Vec3::new(6.0, 2.0, 0.0),
            });
        }

        app.update();

        let world = app.world();
        for attack in world.resource::<Events<MonsterAttack>>().iter_current_update_events() {
            log_info(&format!("Tick {}: attack for {:.1} damage", tick, attack.damage));
        }
        for loot in world.resource::<Events<LootDropRequested>>().iter_current_update_events() {
            log_info(&format!("Tick {}: loot {}/{} at {:?}", tick, loot.index + 1, loot.total, loot.position));
        }
        for removed in world.resource::<Events<MonsterRemoved>>().iter_current_update_events() {
            log_info(&format!("Tick {}: monster removed at {:?}", tick, removed.position));
        }

        if tick % 60 == 0 {
            if let (Some(transform), Some(state)) = (
                world.get::<Transform>(monster),
                world.get::<MonsterState>(monster),
            ) {
                log_info(&format!("Tick {}: {:?} at {:?}", tick, state, transform.translation));
            }
        }
    }

    log_info("Simulation complete!");
}
