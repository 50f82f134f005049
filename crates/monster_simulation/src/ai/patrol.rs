//! Выбор точек патруля вокруг home

use bevy::prelude::*;
use rand::Rng;

use crate::navigation::{horizontal_distance, WorldView};

/// Остаток пути меньше этого = дошли до точки патруля
pub const PATROL_ARRIVAL_THRESHOLD: f32 = 0.5;
/// Новая точка не ближе этого к текущей позиции
pub const MIN_PATROL_HOP: f32 = 2.0;
pub const PATROL_SAMPLE_ATTEMPTS: u32 = 10;
/// Радиус snap'а кандидата на navmesh
pub const PATROL_SNAP_RADIUS: f32 = 2.0;

/// Случайная walkable точка в круге `radius` вокруг `anchor`.
///
/// Кандидаты ближе `MIN_PATROL_HOP` к `current` и вне mesh'а отбрасываются.
/// Все попытки провалились → `anchor`.
pub fn sample_patrol_point<R: Rng + ?Sized>(
    world: &WorldView,
    anchor: Vec3,
    current: Vec3,
    radius: f32,
    rng: &mut R,
) -> Vec3 {
    for _ in 0..PATROL_SAMPLE_ATTEMPTS {
        let angle = rng.gen::<f32>() * std::f32::consts::TAU;
        // sqrt → равномерно по площади круга
        let distance = radius * rng.gen::<f32>().sqrt();
        let candidate = anchor + Vec3::new(angle.cos() * distance, 0.0, angle.sin() * distance);

        let point = if world.has_navigation() {
            match world.sample_walkable(candidate, PATROL_SNAP_RADIUS) {
                Some(point) => point,
                None => continue,
            }
        } else {
            candidate
        };

        if horizontal_distance(point, current) >= MIN_PATROL_HOP {
            return point;
        }
    }

    crate::logger::log_warning(&format!(
        "⚠️ Patrol: no point found around {:?} after {} attempts, using anchor",
        anchor, PATROL_SAMPLE_ATTEMPTS
    ));
    anchor
}
