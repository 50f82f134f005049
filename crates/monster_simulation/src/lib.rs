//! Monster Simulation Core
//!
//! ECS-симуляция монстра на Bevy 0.16 (strategic layer):
//! FSM (patrol / trace / attack / comeback), ballistic прыжки через уступы,
//! knockback (в том числе в воздухе), death sequence с лутом.
//!
//! Engine (или headless `PlatformWorld`) поставляет navmesh, raycast'ы и
//! длины клипов через трейты-коллабораторы; симуляция отвечает событиями.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod combat;
pub mod components;
pub mod death;
pub mod jump;
pub mod knockback;
pub mod logger;
pub mod navigation;
pub mod physics;
pub mod presentation;

// Re-export базовых типов для удобства
pub use ai::{MonsterPlugin, MonsterSet, MonsterState, PatrolPhase};
pub use combat::{CombatPlugin, DamageRequest, DamageResolved, MonsterAttack};
pub use components::*;
pub use death::{DeathSequence, LootDropRequested, MonsterRemoved};
pub use jump::JumpController;
pub use knockback::Knockback;
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use navigation::{insert_world, HeadlessNavigationPlugin, PlatformWorld};
pub use presentation::{MonsterCue, PresentationCue};

/// Частота simulation tick
pub const SIMULATION_HZ: f64 = 60.0;

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            // Детерминистичный RNG (seed по умолчанию, если хост не вставил свой)
            .init_resource::<DeterministicRng>()
            // Подсистемы
            .add_plugins((CombatPlugin, MonsterPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

impl Default for DeterministicRng {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Коллабораторы (navigation/physics/clips) хост вставляет сам.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin);

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
