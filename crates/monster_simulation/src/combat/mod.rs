//! Combat module (damage in, attacks out)
//!
//! ECS ответственность:
//! - Приём урона: invincibility window, health, knockback, запуск смерти
//! - Атаки монстра: `MonsterAttack` (что делать с уроном решает хост)
//!
//! Хост ответственность:
//! - Hitbox/hurtbox коллизии → `DamageRequest`
//! - Применение `MonsterAttack` к игроку

use bevy::prelude::*;

pub mod systems;

pub use systems::{apply_damage, process_damage_requests, tick_monster_timers, DamageTarget};

/// Запрос урона от хоста (hurtbox overlap, проджектайл, скрипт)
#[derive(Event, Debug, Clone)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: f32,
    /// Откуда пришёл удар (направление knockback'а)
    pub source_position: Vec3,
}

/// Результат обработки `DamageRequest`
#[derive(Event, Debug, Clone)]
pub struct DamageResolved {
    pub target: Entity,
    /// false = удар отклонён (неуязвим / умирает / не монстр)
    pub accepted: bool,
    pub lethal: bool,
}

/// Монстр ударил цель
#[derive(Event, Debug, Clone)]
pub struct MonsterAttack {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: f32,
    /// Позиция цели в момент удара
    pub hit_point: Vec3,
}

/// Combat Plugin
///
/// Только события. Системы живут в общей цепочке `MonsterPlugin`
/// (порядок damage → knockback → FSM важен для одного тика).
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<DamageRequest>()
            .add_event::<DamageResolved>()
            .add_event::<MonsterAttack>();
    }
}
