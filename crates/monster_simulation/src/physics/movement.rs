//! Интеграция свободного полёта + детект приземления

use bevy::prelude::*;

use super::GRAVITY;
use crate::navigation::WorldView;

/// Луч вниз стартует чуть выше ступней
const PROBE_LIFT: f32 = 0.1;
/// Длина луча вниз
const PROBE_LENGTH: f32 = 0.5;
/// Радиус fallback sample'а walkable точки
const PROBE_SAMPLE_RADIUS: f32 = 0.6;
/// Агент не выше walkable точки + этот допуск = на земле
const PROBE_HEIGHT_TOLERANCE: f32 = 0.4;

/// Один шаг полёта: гравитация в vy, затем перенос на `velocity·dt`
///
/// Возвращает смещение.
pub fn integrate_ballistic(velocity: &mut Vec3, delta: f32) -> Vec3 {
    velocity.y -= GRAVITY * delta;
    *velocity * delta
}

/// Проверка приземления (вызывать только при снижении).
///
/// 1. Луч вниз из точки чуть выше агента
/// 2. Fallback: walkable точка рядом, агент на уровне mesh'а или ниже
pub fn probe_landing(world: &WorldView, position: Vec3) -> Option<Vec3> {
    if let Some(hit) = world.raycast(position + Vec3::Y * PROBE_LIFT, Vec3::NEG_Y, PROBE_LENGTH) {
        return Some(hit);
    }

    let walkable = world.sample_walkable(position, PROBE_SAMPLE_RADIUS)?;
    (position.y <= walkable.y + PROBE_HEIGHT_TOLERANCE).then_some(walkable)
}

/// Плавный поворот к горизонтальной скорости (rate 10/s)
pub fn face_towards(transform: &mut Transform, velocity: Vec3, delta: f32) {
    let horizontal = Vec3::new(velocity.x, 0.0, velocity.z);
    if horizontal.length_squared() <= 0.01 {
        return;
    }

    let target = Transform::IDENTITY.looking_to(horizontal, Vec3::Y).rotation;
    let t = (delta * 10.0).min(1.0);
    transform.rotation = transform.rotation.slerp(target, t);
}
