//! Monster — агент (позиция в Transform, FSM в MonsterState)

use bevy::prelude::*;

use super::{MotionAuthority, MonsterStats, NavAgent};
use crate::ai::MonsterState;
use crate::jump::JumpController;
use crate::knockback::Knockback;
use crate::presentation::CueTimings;

/// Здоровье
///
/// Инвариант: current ≤ max (меняется только через приём урона)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Отрицательные значения допустимы, проверка смерти через `<= 0`
    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).min(self.max);
    }
}

/// Результат принятого удара
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    pub remaining_health: f32,
    /// Здоровье ушло в ≤ 0 этим ударом
    pub lethal: bool,
}

/// Агент-монстр
///
/// Required components подтягивают всё, что нужно подсистемам.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(
    Transform,
    Health,
    MonsterStats,
    MonsterState,
    NavAgent,
    MotionAuthority,
    JumpController,
    Knockback,
    CueTimings
)]
pub struct Monster {
    /// За кем охотимся (entity с Transform)
    pub target: Option<Entity>,
    /// Якорь патруля / точка возврата
    pub home: Vec3,
    /// Закэшированный destination (сбрасывается при смене состояния)
    pub destination: Option<Vec3>,
    pub attack_timer: f32,
    pub invincibility_timer: f32,
    /// Death sequence уже запущен (idempotent guard)
    pub dying: bool,
    /// Collider/hurtbox активен (выключается во время смерти)
    pub collision_enabled: bool,
}

impl Default for Monster {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Monster {
    pub fn new(home: Vec3) -> Self {
        Self {
            target: None,
            home,
            destination: None,
            attack_timer: 0.0,
            invincibility_timer: 0.0,
            dying: false,
            collision_enabled: true,
        }
    }

    pub fn with_target(mut self, target: Entity) -> Self {
        self.target = Some(target);
        self
    }

    pub fn is_invincible(&self) -> bool {
        self.invincibility_timer > 0.0
    }

    /// Тикает независимо от состояния
    pub fn tick_invincibility(&mut self, delta: f32) {
        if self.invincibility_timer > 0.0 {
            self.invincibility_timer = (self.invincibility_timer - delta).max(0.0);
        }
    }

    /// Приём урона (шаги 1–3): проверки, вычитание, окно неуязвимости.
    ///
    /// `None` = удар отклонён (мёртв / умирает / неуязвим), здоровье не тронуто.
    pub fn try_accept_hit(
        &mut self,
        state: &MonsterState,
        health: &mut Health,
        amount: f32,
        invincibility_duration: f32,
    ) -> Option<HitOutcome> {
        if *state == MonsterState::Death || self.dying || !self.collision_enabled {
            return None;
        }

        if self.is_invincible() {
            return None;
        }

        health.take_damage(amount);
        self.invincibility_timer = invincibility_duration;

        Some(HitOutcome {
            remaining_health: health.current,
            lethal: health.current <= 0.0,
        })
    }

    /// Запуск смерти. `false` если уже умираем (повторный вызов игнорируется).
    pub fn begin_death(&mut self) -> bool {
        if self.dying {
            return false;
        }
        self.dying = true;
        true
    }

    /// Смена состояния сбрасывает закэшированный destination
    pub fn invalidate_destination(&mut self) {
        self.destination = None;
    }
}

/// Компоненты для спавна монстра с конкретными статами
pub fn monster_bundle(stats: MonsterStats, position: Vec3, target: Option<Entity>) -> impl Bundle {
    let mut monster = Monster::new(position);
    monster.target = target;

    let agent = NavAgent {
        speed: stats.move_speed,
        stopping_distance: stats.attack_distance,
        ..Default::default()
    };

    (
        Transform::from_translation(position),
        Health::new(stats.max_health),
        agent,
        stats,
        monster,
    )
}
