//! PlatformWorld — headless navigation/physics substrate
//!
//! Мир из axis-aligned платформ (walkable верх + solid slab под ним).
//! Платформы группируются в регионы связности; регионы соединяются link'ами
//! с "detour" стоимостью (лестницы, пандусы — геометрически не моделируются).
//!
//! Используется headless бинарником и тестами вместо engine navmesh/physics.
//! Одна платформа = одна walkable поверхность (boundary cast останавливается
//! на краю прямоугольника).

use bevy::prelude::*;

use std::sync::Arc;

use super::{NavigationOracle, PathQuery, PathStatus, PhysicsQuery, WorldNavigation, WorldPhysics};

/// Допуск по высоте: насколько точка может быть ниже верха платформы и
/// всё ещё считаться "на ней"
const STAND_BELOW_TOLERANCE: f32 = 0.6;
/// Насколько точка может быть выше верха платформы (актор/цель стоят на ней)
const STAND_ABOVE_TOLERANCE: f32 = 2.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    /// Минимальный угол прямоугольника (x, z)
    pub min: Vec2,
    /// Максимальный угол прямоугольника (x, z)
    pub max: Vec2,
    /// Высота walkable поверхности
    pub top: f32,
    /// Толщина solid slab'а под поверхностью (для raycast)
    pub thickness: f32,
    /// Регион связности (одинаковый регион = пешком дойти можно)
    pub region: u32,
}

impl Platform {
    pub fn new(min: Vec2, max: Vec2, top: f32, region: u32) -> Self {
        Self {
            min,
            max,
            top,
            thickness: 0.5,
            region,
        }
    }

    /// Solid блок от `top - thickness` до `top`
    pub fn with_thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness;
        self
    }

    pub fn contains_xz(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.z >= self.min.y && point.z <= self.max.y
    }

    /// Ближайшая точка поверхности к `point`
    pub fn closest_surface_point(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            self.top,
            point.z.clamp(self.min.y, self.max.y),
        )
    }

    fn supports(&self, point: Vec3) -> bool {
        self.contains_xz(point)
            && point.y >= self.top - STAND_BELOW_TOLERANCE
            && point.y <= self.top + STAND_ABOVE_TOLERANCE
    }

    fn box_min(&self) -> Vec3 {
        Vec3::new(self.min.x, self.top - self.thickness, self.min.y)
    }

    fn box_max(&self) -> Vec3 {
        Vec3::new(self.max.x, self.top, self.max.y)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct RegionLink {
    a: u32,
    b: u32,
    detour: f32,
}

#[derive(Debug, Clone, Default)]
pub struct PlatformWorld {
    platforms: Vec<Platform>,
    links: Vec<RegionLink>,
}

impl PlatformWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platforms.push(platform);
        self
    }

    /// Регионы `a` и `b` проходимы пешком с дополнительной длиной пути `detour`
    pub fn with_link(mut self, a: u32, b: u32, detour: f32) -> Self {
        self.links.push(RegionLink { a, b, detour });
        self
    }

    /// Один и тот же мир как оба коллаборатора
    pub fn into_resources(self) -> (WorldNavigation, WorldPhysics) {
        let shared = Arc::new(self);
        (WorldNavigation(shared.clone()), WorldPhysics(shared))
    }

    /// Платформа, на которой стоит точка (самая высокая из подходящих)
    pub fn platform_at(&self, point: Vec3) -> Option<&Platform> {
        self.platforms
            .iter()
            .filter(|platform| platform.supports(point))
            .max_by(|a, b| a.top.total_cmp(&b.top))
    }

    /// Минимальная суммарная detour стоимость между регионами (Dijkstra по link'ам)
    fn region_detour(&self, from: u32, to: u32) -> Option<f32> {
        if from == to {
            return Some(0.0);
        }

        let mut best: Vec<(u32, f32)> = vec![(from, 0.0)];
        let mut settled: Vec<u32> = Vec::new();

        loop {
            let current = best
                .iter()
                .filter(|(region, _)| !settled.contains(region))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .copied();

            let Some((region, cost)) = current else {
                return None;
            };

            if region == to {
                return Some(cost);
            }
            settled.push(region);

            for link in &self.links {
                let next = if link.a == region {
                    link.b
                } else if link.b == region {
                    link.a
                } else {
                    continue;
                };

                let next_cost = cost + link.detour;
                match best.iter_mut().find(|(r, _)| *r == next) {
                    Some(entry) if entry.1 > next_cost => entry.1 = next_cost,
                    Some(_) => {}
                    None => best.push((next, next_cost)),
                }
            }
        }
    }
}

impl NavigationOracle for PlatformWorld {
    fn find_path(&self, from: Vec3, to: Vec3) -> Option<PathQuery> {
        let start = self.platform_at(from)?;

        let Some(goal) = self.platform_at(to) else {
            // Цель вне mesh'а → идём до ближайшей точки своей платформы
            let partial_end = start.closest_surface_point(to);
            return Some(PathQuery {
                status: PathStatus::Partial,
                length: from.distance(partial_end),
            });
        };

        match self.region_detour(start.region, goal.region) {
            Some(detour) => Some(PathQuery {
                status: PathStatus::Complete,
                length: from.distance(to) + detour,
            }),
            None => {
                let partial_end = start.closest_surface_point(to);
                Some(PathQuery {
                    status: PathStatus::Partial,
                    length: from.distance(partial_end),
                })
            }
        }
    }

    fn sample_walkable(&self, point: Vec3, radius: f32) -> Option<Vec3> {
        self.platforms
            .iter()
            .map(|platform| platform.closest_surface_point(point))
            .filter(|candidate| candidate.distance(point) <= radius)
            .min_by(|a, b| a.distance(point).total_cmp(&b.distance(point)))
    }

    fn cast_to_mesh_boundary(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
        let platform = self.platform_at(origin)?;
        let dir = Vec2::new(direction.x, direction.z).normalize_or_zero();
        if dir == Vec2::ZERO {
            return None;
        }

        let start = Vec2::new(origin.x, origin.z);
        let mut exit = f32::INFINITY;
        for axis in 0..2 {
            let d = dir[axis];
            if d > f32::EPSILON {
                exit = exit.min((platform.max[axis] - start[axis]) / d);
            } else if d < -f32::EPSILON {
                exit = exit.min((platform.min[axis] - start[axis]) / d);
            }
        }

        let exit = exit.max(0.0);
        if exit > max_distance {
            return None;
        }

        let edge = start + dir * exit;
        Some(Vec3::new(edge.x, platform.top, edge.y))
    }
}

impl PhysicsQuery for PlatformWorld {
    fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return None;
        }

        self.platforms
            .iter()
            .filter_map(|platform| ray_box_entry(origin, dir, platform.box_min(), platform.box_max()))
            .filter(|t| *t <= max_distance)
            .min_by(|a, b| a.total_cmp(b))
            .map(|t| origin + dir * t)
    }
}

/// Slab-test: дистанция входа луча в AABB. Старт внутри бокса = промах
/// (как у engine raycast'ов).
fn ray_box_entry(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];

        if d.abs() < 1e-6 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let mut t0 = (min[axis] - o) / d;
        let mut t1 = (max[axis] - o) / d;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        t_enter = t_enter.max(t0);
        t_exit = t_exit.min(t1);
        if t_enter > t_exit {
            return None;
        }
    }

    (t_enter >= 0.0).then_some(t_enter)
}
