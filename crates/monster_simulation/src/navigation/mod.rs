//! Navigation + physics queries (внешние коллабораторы)
//!
//! Симуляция не строит navmesh и не считает коллизии сама. Хост (engine bridge
//! или headless `PlatformWorld`) вставляет реализации как ресурсы:
//! - `WorldNavigation` — path existence/length, nearest walkable point, mesh boundary cast
//! - `WorldPhysics` — raycast по ground layer
//!
//! Системы собирают из них `WorldView` на один тик. Оба коллаборатора опциональны.

use bevy::prelude::*;
use std::sync::Arc;

pub mod follower;
pub mod platforms;

pub use follower::{follow_navigation_paths, HeadlessNavigationPlugin};
pub use platforms::{Platform, PlatformWorld};

/// Sample radius для "snap на ближайшую walkable точку"
pub const SETTLE_RADIUS: f32 = 2.0;

/// Максимальная длина boundary cast (метры)
pub const BOUNDARY_CAST_DISTANCE: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum PathStatus {
    /// Путь доходит до цели
    Complete,
    /// Путь обрывается на краю связной области
    Partial,
    /// Путь не построен
    Invalid,
}

/// Результат path query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathQuery {
    pub status: PathStatus,
    /// Суммарная длина всех сегментов пути
    pub length: f32,
}

pub trait NavigationOracle: Send + Sync {
    /// `None` = путь не существует вообще
    fn find_path(&self, from: Vec3, to: Vec3) -> Option<PathQuery>;

    /// Ближайшая walkable точка в радиусе `radius`
    fn sample_walkable(&self, point: Vec3, radius: f32) -> Option<Vec3>;

    /// Идём от `origin` по `direction` (по mesh'у) до первой границы.
    /// `None` если граница не встретилась в пределах `max_distance`.
    fn cast_to_mesh_boundary(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3>;
}

pub trait PhysicsQuery: Send + Sync {
    /// Точка попадания луча в ground layer
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3>;
}

#[derive(Resource, Clone)]
pub struct WorldNavigation(pub Arc<dyn NavigationOracle>);

#[derive(Resource, Clone)]
pub struct WorldPhysics(pub Arc<dyn PhysicsQuery>);

/// Вставляет один мир как оба коллаборатора сразу
pub fn insert_world<W>(app: &mut App, world: W)
where
    W: NavigationOracle + PhysicsQuery + 'static,
{
    let world = Arc::new(world);
    app.insert_resource(WorldNavigation(world.clone()))
        .insert_resource(WorldPhysics(world));
}

/// Borrowed view на коллабораторов (на один тик системы)
#[derive(Clone, Copy, Default)]
pub struct WorldView<'a> {
    pub navigation: Option<&'a dyn NavigationOracle>,
    pub physics: Option<&'a dyn PhysicsQuery>,
}

impl<'a> WorldView<'a> {
    pub fn new(navigation: Option<&'a WorldNavigation>, physics: Option<&'a WorldPhysics>) -> Self {
        Self {
            navigation: navigation.map(|nav| nav.0.as_ref()),
            physics: physics.map(|phys| phys.0.as_ref()),
        }
    }

    pub fn has_navigation(&self) -> bool {
        self.navigation.is_some()
    }

    pub fn find_path(&self, from: Vec3, to: Vec3) -> Option<PathQuery> {
        self.navigation.and_then(|nav| nav.find_path(from, to))
    }

    pub fn sample_walkable(&self, point: Vec3, radius: f32) -> Option<Vec3> {
        self.navigation.and_then(|nav| nav.sample_walkable(point, radius))
    }

    pub fn cast_to_mesh_boundary(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
        self.navigation
            .and_then(|nav| nav.cast_to_mesh_boundary(origin, direction, max_distance))
    }

    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
        self.physics
            .and_then(|phys| phys.raycast(origin, direction, max_distance))
    }

    /// Snap на walkable точку: радиус 2 → `widened_radius` → `fallback`.
    ///
    /// Без navigation точка возвращается как есть (некуда снапать).
    pub fn settle(&self, point: Vec3, widened_radius: f32, fallback: Vec3) -> Vec3 {
        if !self.has_navigation() {
            return point;
        }

        if let Some(snapped) = self.sample_walkable(point, SETTLE_RADIUS) {
            return snapped;
        }

        if let Some(snapped) = self.sample_walkable(point, widened_radius) {
            crate::logger::log_warning(&format!(
                "⚠️ Settle: widened search ({}m) for {:?} → {:?}",
                widened_radius, point, snapped
            ));
            return snapped;
        }

        crate::logger::log_warning(&format!(
            "⚠️ Settle: no walkable point near {:?}, falling back to {:?}",
            point, fallback
        ));
        fallback
    }

    /// Проекция цели на землю.
    ///
    /// Порядок: walkable рядом с целью (r=10) → луч вниз из цели + snap (r=2)
    /// → walkable на высоте агента (r=5). `None` = земля неизвестна.
    pub fn project_ground(&self, target: Vec3, agent_height: f32) -> Option<Vec3> {
        if let Some(ground) = self.sample_walkable(target, 10.0) {
            return Some(ground);
        }

        if let Some(hit) = self.raycast(target + Vec3::Y * 0.5, Vec3::NEG_Y, 20.0) {
            if let Some(ground) = self.sample_walkable(hit, SETTLE_RADIUS) {
                return Some(ground);
            }
        }

        let same_height = Vec3::new(target.x, agent_height, target.z);
        self.sample_walkable(same_height, 5.0)
    }
}

/// Горизонтальная проекция вектора (y = 0)
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Горизонтальная дистанция между точками
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    flatten(b - a).length()
}

/// Нормализованное горизонтальное направление `from → to` (если не вырождено)
pub fn horizontal_direction(from: Vec3, to: Vec3) -> Option<Vec3> {
    let delta = flatten(to - from);
    if delta.length_squared() < 0.01 {
        None
    } else {
        Some(delta.normalize())
    }
}
