//! FSM components (state machine, patrol sub-phase).

use bevy::prelude::*;

/// Фаза патруля
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum PatrolPhase {
    /// Идём к сэмплированной точке
    Moving { point: Vec3 },
    /// Стоим на точке, по истечении — новая точка
    Waiting { remaining: f32 },
}

/// Monster FSM состояния
///
/// Knockback — не состояние, а ортогональный флаг (`Knockback` + `MotionAuthority`).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub enum MonsterState {
    /// Idle — начальное состояние после спавна
    Idle,

    /// Patrol — блуждание вокруг home
    Patrol { phase: PatrolPhase },

    /// Trace — преследование цели (может запросить прыжок)
    Trace,

    /// Comeback — цель потеряна, возвращаемся к home
    Comeback,

    /// Attack — цель в радиусе атаки
    Attack,

    /// Jump — ballistic манёвр, FSM ждёт JumpCompleted
    Jump,

    /// Death — терминальное, дальше только DeathSequence
    Death,
}

impl Default for MonsterState {
    fn default() -> Self {
        Self::Idle
    }
}

impl MonsterState {
    /// Патруль с немедленным выбором новой точки
    pub fn patrol() -> Self {
        Self::Patrol {
            phase: PatrolPhase::Waiting { remaining: 0.0 },
        }
    }

    /// FSM ведёт это состояние сама (Jump/Death ведут другие подсистемы)
    pub fn is_fsm_driven(&self) -> bool {
        !matches!(self, Self::Jump | Self::Death)
    }

    pub fn is_dead(&self) -> bool {
        matches!(self, Self::Death)
    }
}
