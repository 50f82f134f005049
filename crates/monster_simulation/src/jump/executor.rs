//! JumpExecutor — интеграция баллистики и посадка

use bevy::prelude::*;

use super::{JumpController, JUMP_FAIL_COOLDOWN, LANDING_HEIGHT_TOLERANCE, MAX_IMMEDIATE_RETRIES};
use crate::navigation::WorldView;
use crate::physics::{face_towards, integrate_ballistic, probe_landing, MAX_FALL_HEIGHT};

/// Запас под высотой старта сверх MAX_FALL_HEIGHT до принудительной посадки
const SAFETY_FALL_MARGIN: f32 = 2.0;
/// Расширенный радиус snap'а при обычной посадке
const LANDING_WIDEN_RADIUS: f32 = 5.0;
/// Расширенный радиус snap'а при принудительной посадке
const FORCED_WIDEN_RADIUS: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum JumpPhase {
    /// Телеграф (windup анимация), агент стоит
    Preparing { remaining: f32 },
    Airborne,
}

/// Активный прыжок. Живёт от старта до посадки или отмены.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct JumpSession {
    pub start: Vec3,
    /// Запланированная точка посадки
    pub landing: Vec3,
    pub velocity: Vec3,
    /// Высота цели на момент старта (проверка "сел слишком высоко")
    pub target_height: f32,
    pub phase: JumpPhase,
    pub flight_time: f32,
}

impl JumpSession {
    /// Вертикальная скорость в полёте. `None` пока стоим на земле (windup).
    pub fn vertical_velocity(&self) -> Option<f32> {
        match self.phase {
            JumpPhase::Preparing { .. } => None,
            JumpPhase::Airborne => Some(self.velocity.y),
        }
    }

    /// Один тик. `Some((resting, forced))` = посадка.
    fn step(&mut self, transform: &mut Transform, world: &WorldView, delta: f32) -> Option<(Vec3, bool)> {
        if let JumpPhase::Preparing { remaining } = self.phase {
            let remaining = remaining - delta;
            self.phase = if remaining <= 0.0 {
                JumpPhase::Airborne
            } else {
                JumpPhase::Preparing { remaining }
            };
            return None;
        }

        transform.translation += integrate_ballistic(&mut self.velocity, delta);
        face_towards(transform, self.velocity, delta);

        if self.velocity.y < 0.0 {
            if let Some(contact) = probe_landing(world, transform.translation) {
                return Some((world.settle(contact, LANDING_WIDEN_RADIUS, self.start), false));
            }
        }

        // Safety valve: ошибка планирования не должна дать бесконечное падение
        if transform.translation.y < self.start.y - MAX_FALL_HEIGHT - SAFETY_FALL_MARGIN {
            crate::logger::log_warning(&format!(
                "⚠️ Jump safety valve: fell below {:.2} (start {:?}), forcing landing",
                transform.translation.y, self.start
            ));
            return Some((
                world.settle(transform.translation, FORCED_WIDEN_RADIUS, self.start),
                true,
            ));
        }

        None
    }
}

/// Итог прыжка
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpLanding {
    /// Проверенная walkable позиция (уже записана в Transform)
    pub resting: Vec3,
    /// Принудительная посадка (safety valve)
    pub forced: bool,
    /// Сели на промежуточный уступ: cooldown сброшен, можно прыгать сразу
    pub retry_immediately: bool,
}

impl JumpController {
    /// Тик исполнения. `Some` = прыжок завершён, сессия очищена.
    pub fn advance(&mut self, transform: &mut Transform, world: &WorldView, delta: f32) -> Option<JumpLanding> {
        let session = self.session.as_mut()?;
        let (resting, forced) = session.step(transform, world, delta)?;
        let target_height = session.target_height;

        self.session = None;
        transform.translation = resting;
        self.reset_stuck(resting);

        let retry_immediately = if forced {
            self.cooldown = JUMP_FAIL_COOLDOWN;
            self.immediate_retries = 0;
            false
        } else if resting.y - target_height > LANDING_HEIGHT_TOLERANCE {
            if self.immediate_retries < MAX_IMMEDIATE_RETRIES {
                self.immediate_retries += 1;
                self.cooldown = 0.0;
                crate::logger::log(&format!(
                    "🔁 Landed too high ({:.2} vs target {:.2}), immediate retry {}/{}",
                    resting.y, target_height, self.immediate_retries, MAX_IMMEDIATE_RETRIES
                ));
                true
            } else {
                crate::logger::log(&format!(
                    "⏳ Landed too high again ({:.2} vs target {:.2}), retries exhausted",
                    resting.y, target_height
                ));
                self.immediate_retries = 0;
                false
            }
        } else {
            self.immediate_retries = 0;
            false
        };

        Some(JumpLanding {
            resting,
            forced,
            retry_immediately,
        })
    }

    /// CancelJump: текущая вертикальная скорость (для airborne knockback).
    /// `None` если прыжка нет или он ещё в windup (монстр на земле).
    /// Посадочная логика не выполняется.
    pub fn cancel(&mut self) -> Option<f32> {
        let session = self.session.take()?;
        let vertical = session.vertical_velocity();
        crate::logger::log(&format!("✂️ Jump cancelled, vertical velocity {:?}", vertical));
        vertical
    }
}
