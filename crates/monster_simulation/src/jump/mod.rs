//! Jump subsystem: планирование (JumpPlanner) + исполнение (JumpExecutor)
//!
//! Прыжок — манёвр для пересечения уступов/провалов, которые navmesh
//! пешком не проходит. Планировщик работает в Trace, исполнитель — пока
//! `MotionAuthority::Ballistic`.

use bevy::prelude::*;
use thiserror::Error;

pub mod executor;
pub mod planner;

#[cfg(test)]
mod executor_tests;

pub use executor::{JumpLanding, JumpPhase, JumpSession};
pub use planner::{JumpContext, JumpController, JumpKind, JumpPlan};

/// Cooldown после успешного старта
pub const JUMP_COOLDOWN: f32 = 1.5;
/// Cooldown после провала планирования (анти-трэшинг)
pub const JUMP_FAIL_COOLDOWN: f32 = 3.0;
/// Путь длиннее прямой во столько раз = обход, прыжок оправдан
pub const PATH_DETOUR_THRESHOLD: f32 = 2.0;
/// Допуск по высоте посадки относительно высоты цели
pub const LANDING_HEIGHT_TOLERANCE: f32 = 1.5;
/// Сдвиг позиции за тик меньше этого = не двигаемся
pub const STUCK_EPSILON: f32 = 0.05;
/// Сколько раз подряд разрешён немедленный повторный прыжок после посадки
/// на промежуточный уступ
pub const MAX_IMMEDIATE_RETRIES: u32 = 2;

/// Почему прыжок "не сейчас". Никогда не пробрасывается наружу —
/// только лог и cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Reflect)]
pub enum JumpRejection {
    #[error("jump planning disabled: navigation is not available")]
    NavigationUnavailable,
    #[error("jump is on cooldown")]
    CoolingDown,
    #[error("target is on the same level")]
    NoHeightDifference,
    #[error("target is higher than the maximum jump height")]
    TooHigh,
    #[error("target is deeper than the maximum fall height")]
    TooDeep,
    #[error("no walkable mesh boundary between agent and target")]
    NoPlatformEdge,
    #[error("no ground found below the mesh boundary")]
    NoLandingBelow,
    #[error("ground below the boundary does not match the target height")]
    LandingMismatch,
    #[error("gap is wider than the ballistic envelope")]
    OutOfReach,
    #[error("walking there is just as good")]
    NotNecessary,
    #[error("no valid landing spot found")]
    NoLandingFound,
    #[error("landing spot is on the same level")]
    LandingTooFlat,
    #[error("overhead obstruction within jump height")]
    ObstructedOverhead,
}
