//! KnockbackController — смещение от удара (impulse + decay)
//!
//! Два режима:
//! - grounded: горизонтальный импульс, затухание, стоп по скорости или таймауту
//! - airborne (удар во время прыжка): та же гравитация, что у прыжка,
//!   вертикальная скорость наследуется от отменённого прыжка, стоп по
//!   посадке или таймауту
//!
//! По завершении агент снапается на walkable точку (2м → 5м → home).

use bevy::prelude::*;

use crate::components::MonsterStats;
use crate::navigation::{flatten, horizontal_direction, WorldView};
use crate::physics::{probe_landing, GRAVITY};


/// Скорость² ниже этого = knockback погас
const SETTLE_SPEED_SQ: f32 = 0.01;
/// Расширенный радиус snap'а после knockback'а
const KNOCKBACK_WIDEN_RADIUS: f32 = 5.0;

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct KnockbackSession {
    /// Горизонтальная скорость
    pub velocity: Vec3,
    /// Только для airborne
    pub vertical_velocity: f32,
    pub elapsed: f32,
    pub airborne: bool,
}

/// Чем закончился knockback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum KnockbackEnd {
    /// Скорость затухла
    Settled,
    /// Safety valve по длительности
    TimedOut,
    /// Airborne: коснулись земли
    Landed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnockbackCompletion {
    /// Проверенная walkable позиция (уже записана в Transform)
    pub resting: Vec3,
    pub reason: KnockbackEnd,
}

#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct Knockback {
    pub session: Option<KnockbackSession>,
}

impl Knockback {
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_airborne(&self) -> bool {
        self.session.as_ref().is_some_and(|session| session.airborne)
    }

    /// StartKnockback. Повторный удар перезапускает таймер и импульс.
    ///
    /// `inherited_vertical` — вертикальная скорость отменённого прыжка
    /// (airborne режим). Если уже летим от прошлого удара, остаёмся в воздухе.
    pub fn start(
        &mut self,
        agent: &Transform,
        source: Vec3,
        force: f32,
        inherited_vertical: Option<f32>,
    ) {
        let direction = horizontal_direction(source, agent.translation)
            .unwrap_or_else(|| flatten(agent.back().as_vec3()).normalize_or_zero());

        let (airborne, vertical_velocity) = match (inherited_vertical, self.session.as_ref()) {
            (Some(vertical), _) => (true, vertical),
            (None, Some(previous)) if previous.airborne => (true, previous.vertical_velocity),
            (None, _) => (false, 0.0),
        };

        self.session = Some(KnockbackSession {
            velocity: direction * force,
            vertical_velocity,
            elapsed: 0.0,
            airborne,
        });
    }

    /// Тик. `Some` = knockback завершён, позиция снапнута.
    pub fn advance(
        &mut self,
        transform: &mut Transform,
        world: &WorldView,
        stats: &MonsterStats,
        home: Vec3,
        delta: f32,
    ) -> Option<KnockbackCompletion> {
        let session = self.session.as_mut()?;
        session.elapsed += delta;

        let decay = (stats.knockback_decay * delta).min(1.0);
        let timed_out = session.elapsed >= stats.knockback_duration;

        let finished = if session.airborne {
            if timed_out {
                Some((transform.translation, KnockbackEnd::TimedOut))
            } else {
                session.vertical_velocity -= GRAVITY * delta;
                let movement = session.velocity + Vec3::Y * session.vertical_velocity;
                transform.translation += movement * delta;
                session.velocity = session.velocity.lerp(Vec3::ZERO, decay);

                if session.vertical_velocity < 0.0 {
                    probe_landing(world, transform.translation).map(|contact| (contact, KnockbackEnd::Landed))
                } else {
                    None
                }
            }
        } else if session.velocity.length_squared() < SETTLE_SPEED_SQ {
            Some((transform.translation, KnockbackEnd::Settled))
        } else if timed_out {
            Some((transform.translation, KnockbackEnd::TimedOut))
        } else {
            transform.translation += session.velocity * delta;
            session.velocity = session.velocity.lerp(Vec3::ZERO, decay);
            None
        };

        let (point, reason) = finished?;
        self.session = None;

        let resting = world.settle(point, KNOCKBACK_WIDEN_RADIUS, home);
        transform.translation = resting;

        Some(KnockbackCompletion { resting, reason })
    }
}
