//! AI Events — уведомления между подсистемами монстра
//!
//! Вместо callback'ов: подсистема пишет событие, FSM читает его в
//! следующей системе цепочки (в том же тике).

use bevy::prelude::*;

use crate::jump::{JumpKind, JumpLanding};
use crate::knockback::KnockbackEnd;

/// JumpPlanner стартовал прыжок ("prepare")
#[derive(Event, Debug, Clone)]
pub struct JumpStarted {
    pub entity: Entity,
    pub kind: JumpKind,
    pub landing: Vec3,
    /// Ожидаемое время полёта (для playback speed)
    pub flight_time: f32,
}

/// JumpExecutor завершил прыжок ("completed")
#[derive(Event, Debug, Clone)]
pub struct JumpCompleted {
    pub entity: Entity,
    pub landing: JumpLanding,
}

/// KnockbackController завершил смещение
#[derive(Event, Debug, Clone)]
pub struct KnockbackCompleted {
    pub entity: Entity,
    pub resting: Vec3,
    pub reason: KnockbackEnd,
}
