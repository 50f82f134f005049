//! ECS Components монстра
//!
//! Организация по доменам:
//! - monster: агент (Monster, Health)
//! - stats: конфигурация (MonsterStats, LootTable)
//! - movement: navigation intent + motion authority (NavAgent, MotionAuthority)

pub mod monster;
pub mod movement;
pub mod stats;

pub use monster::*;
pub use movement::*;
pub use stats::*;
