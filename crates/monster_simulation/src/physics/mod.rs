//! Упрощённая баллистика (постоянная гравитация, без rigid body)
//!
//! Общая для JumpExecutor и airborne knockback.

use bevy::prelude::*;

pub mod movement;

pub use movement::{face_towards, integrate_ballistic, probe_landing};

/// Гравитация (m/s²), одинаковая для прыжка и airborne knockback
pub const GRAVITY: f32 = 20.0;

/// Демпфер envelope'а (защита от перелёта на границе досягаемости)
pub const ENVELOPE_SAFETY_FACTOR: f32 = 0.7;

/// Максимальная высота падения, которую монстр рассматривает
pub const MAX_FALL_HEIGHT: f32 = 10.0;

/// Максимальная высота прыжка: v² / 2g
pub fn max_jump_height(jump_force: f32) -> f32 {
    (jump_force * jump_force) / (2.0 * GRAVITY)
}

/// Горизонтальная досягаемость при приземлении на высоту старта
pub fn max_jump_distance(jump_force: f32, horizontal_speed: f32) -> f32 {
    let air_time = 2.0 * jump_force / GRAVITY;
    air_time * horizontal_speed * ENVELOPE_SAFETY_FACTOR
}

/// Горизонтальная досягаемость при прыжке вниз на `fall_height`
///
/// Время = подъём до апекса + падение с (fall_height + апекс).
pub fn max_fall_distance(jump_force: f32, horizontal_speed: f32, fall_height: f32) -> f32 {
    let rise_time = jump_force / GRAVITY;
    let total_fall = fall_height.abs() + max_jump_height(jump_force);
    let fall_time = (2.0 * total_fall / GRAVITY).sqrt();
    (rise_time + fall_time) * horizontal_speed * ENVELOPE_SAFETY_FACTOR
}

/// Ожидаемое время полёта до высоты `height_delta` относительно старта.
///
/// Нисходящий корень `y(t) = F·t - g·t²/2 = dh`. Если цель выше апекса —
/// время до апекса.
pub fn flight_time(jump_force: f32, height_delta: f32) -> f32 {
    let discriminant = jump_force * jump_force - 2.0 * GRAVITY * height_delta;
    if discriminant <= 0.0 {
        return jump_force / GRAVITY;
    }
    (jump_force + discriminant.sqrt()) / GRAVITY
}
