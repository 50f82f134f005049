//! JumpPlanner — решает, нужен ли прыжок, и ищет точку приземления
//!
//! Порядок проверок (дешёвые сначала):
//! 1. cooldown
//! 2. перепад высоты до проекции цели на землю (вверх / вниз / нет)
//! 3. досягаемость по высоте (F²/2g вверх, MAX_FALL_HEIGHT вниз)
//! 4. горизонтальная дистанция через провал (mesh boundary)
//! 5. ballistic envelope
//! 6. необходимость: нет пути / partial / большой обход / застряли

use bevy::prelude::*;

use super::{
    JumpPhase, JumpRejection, JumpSession, JUMP_COOLDOWN, JUMP_FAIL_COOLDOWN, LANDING_HEIGHT_TOLERANCE,
    PATH_DETOUR_THRESHOLD, STUCK_EPSILON,
};
use crate::components::MonsterStats;
use crate::navigation::{
    flatten, horizontal_direction, horizontal_distance, PathStatus, WorldView, BOUNDARY_CAST_DISTANCE,
    SETTLE_RADIUS,
};
use crate::physics::{self, MAX_FALL_HEIGHT};

/// Дистанции сетки поиска посадки (вдоль направления на цель)
const LANDING_SEARCH_DISTANCES: [f32; 7] = [2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
/// Радиус fallback sample'а у проекции цели
const LANDING_FALLBACK_RADIUS: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum JumpKind {
    /// Цель выше
    Up,
    /// Цель ниже
    Down,
}

/// Всё, что планировщику нужно знать о тике
pub struct JumpContext<'a> {
    pub position: Vec3,
    pub forward: Vec3,
    /// Позиция цели (не проекция)
    pub target: Vec3,
    pub stats: &'a MonsterStats,
    pub world: WorldView<'a>,
}

/// Результат успешного старта (для события и presentation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpPlan {
    pub kind: JumpKind,
    pub landing: Vec3,
    pub velocity: Vec3,
    /// Ожидаемое время полёта (секунды)
    pub flight_time: f32,
}

/// Состояние прыжковой подсистемы монстра
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct JumpController {
    pub cooldown: f32,
    pub stuck_timer: f32,
    /// Последняя позиция, с которой реально сдвинулись
    pub last_position: Option<Vec3>,
    /// Последняя известная проекция цели на землю
    pub target_ground: Option<Vec3>,
    /// Активный прыжок (preparing / airborne)
    pub session: Option<JumpSession>,
    /// Немедленные повторы подряд после посадки на промежуточный уступ
    pub immediate_retries: u32,
    /// false если navigation не подключена (прыжки никогда не стартуют)
    pub enabled: bool,
}

impl Default for JumpController {
    fn default() -> Self {
        Self {
            cooldown: 0.0,
            stuck_timer: 0.0,
            last_position: None,
            target_ground: None,
            session: None,
            immediate_retries: 0,
            enabled: true,
        }
    }
}

impl JumpController {
    pub fn is_jumping(&self) -> bool {
        self.session.is_some()
    }

    pub fn tick_cooldown(&mut self, delta: f32) {
        if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - delta).max(0.0);
        }
    }

    /// Обновляет проекцию цели. Если земля не найдена — остаётся прошлая.
    pub fn refresh_target_ground(&mut self, world: &WorldView, target: Vec3, agent_height: f32) {
        if let Some(ground) = world.project_ground(target, agent_height) {
            self.target_ground = Some(ground);
        }
    }

    /// Куда целимся: проекция на землю, иначе сама цель
    pub fn target_point(&self, target: Vec3) -> Vec3 {
        self.target_ground.unwrap_or(target)
    }

    /// Граница mesh'а цели, ближайшая к агенту (cast от проекции цели к агенту).
    /// Возвращает точку и горизонтальную дистанцию агент → граница.
    pub fn target_platform_edge(&self, ctx: &JumpContext) -> Option<(Vec3, f32)> {
        let ground = self.target_ground?;
        let direction = horizontal_direction(ground, ctx.position)?;
        let edge = ctx
            .world
            .cast_to_mesh_boundary(ground, direction, BOUNDARY_CAST_DISTANCE)?;
        Some((edge, horizontal_distance(ctx.position, edge)))
    }

    /// Граница собственного mesh'а агента в сторону цели (staging point перед прыжком)
    pub fn own_mesh_edge(&self, ctx: &JumpContext) -> Option<Vec3> {
        let direction = horizontal_direction(ctx.position, ctx.target)?;
        ctx.world
            .cast_to_mesh_boundary(ctx.position, direction, BOUNDARY_CAST_DISTANCE)
    }

    /// Точка посадки внизу: шаг за свою границу, луч вниз, snap на mesh.
    /// Fallback — проекция цели.
    pub fn downward_landing(&self, ctx: &JumpContext) -> Option<Vec3> {
        let edge = self.own_mesh_edge(ctx)?;
        let direction = horizontal_direction(edge, ctx.target)?;

        let ray_start = edge + direction + Vec3::Y * 0.5;
        if let Some(hit) = ctx.world.raycast(ray_start, Vec3::NEG_Y, MAX_FALL_HEIGHT + 5.0) {
            return Some(ctx.world.sample_walkable(hit, SETTLE_RADIUS).unwrap_or(hit));
        }

        self.target_ground
    }

    /// ShouldJump с причиной отказа
    pub fn evaluate(&self, ctx: &JumpContext) -> Result<JumpKind, JumpRejection> {
        if !self.enabled || !ctx.world.has_navigation() {
            return Err(JumpRejection::NavigationUnavailable);
        }

        if self.cooldown > 0.0 {
            return Err(JumpRejection::CoolingDown);
        }

        let stats = ctx.stats;
        let target_point = self.target_point(ctx.target);
        let height_diff = target_point.y - ctx.position.y;

        let is_above = height_diff >= stats.min_height_diff_for_jump;
        let is_below = height_diff <= -stats.min_height_diff_for_jump;

        if is_above && height_diff > stats.max_jump_height() {
            return Err(JumpRejection::TooHigh);
        }
        if is_below && height_diff.abs() > MAX_FALL_HEIGHT {
            return Err(JumpRejection::TooDeep);
        }
        if !is_above && !is_below {
            return Err(JumpRejection::NoHeightDifference);
        }

        let kind = if is_above { JumpKind::Up } else { JumpKind::Down };

        let gap = match kind {
            JumpKind::Up => {
                let (_, distance) = self
                    .target_platform_edge(ctx)
                    .ok_or(JumpRejection::NoPlatformEdge)?;
                distance
            }
            JumpKind::Down => {
                let landing = self
                    .downward_landing(ctx)
                    .ok_or(JumpRejection::NoLandingBelow)?;
                if (landing.y - target_point.y).abs() > LANDING_HEIGHT_TOLERANCE {
                    return Err(JumpRejection::LandingMismatch);
                }
                let edge = self.own_mesh_edge(ctx).ok_or(JumpRejection::NoPlatformEdge)?;
                horizontal_distance(edge, landing)
            }
        };

        let envelope = match kind {
            JumpKind::Up => stats.max_jump_distance(),
            JumpKind::Down => stats.max_fall_distance(height_diff.abs()),
        };
        if gap > envelope {
            return Err(JumpRejection::OutOfReach);
        }

        // Физически можно — но нужно ли?
        let Some(path) = ctx.world.find_path(ctx.position, target_point) else {
            return Ok(kind);
        };

        match path.status {
            PathStatus::Invalid | PathStatus::Partial => Ok(kind),
            PathStatus::Complete => {
                let straight = ctx.position.distance(target_point);
                let is_detour = path.length > straight * PATH_DETOUR_THRESHOLD;
                let is_stuck = self.stuck_timer >= stats.stuck_threshold;

                if is_detour || is_stuck {
                    Ok(kind)
                } else {
                    Err(JumpRejection::NotNecessary)
                }
            }
        }
    }

    pub fn should_jump(&self, ctx: &JumpContext) -> bool {
        self.evaluate(ctx).is_ok()
    }

    /// Поиск посадки: сетка (дистанция × высота) в пределах envelope,
    /// каждый кандидат снапается на mesh; лучший по близости к высоте цели.
    pub fn find_landing(&self, ctx: &JumpContext) -> Option<Vec3> {
        let stats = ctx.stats;
        let my_height = ctx.position.y;
        let target_point = self.target_point(ctx.target);
        let target_height = target_point.y;
        let height_diff = target_height - my_height;
        let max_height = stats.max_jump_height();

        let jumping_up = height_diff > 0.0;
        let max_distance = if jumping_up {
            stats.max_jump_distance()
        } else {
            stats.max_fall_distance(height_diff.abs())
        };

        let direction = horizontal_direction(ctx.position, target_point)
            .unwrap_or_else(|| fallback_direction(ctx.forward));

        let search_heights = if jumping_up {
            [
                my_height + max_height,
                my_height + max_height * 0.8,
                my_height + max_height * 0.6,
                target_height,
            ]
        } else {
            [
                target_height,
                target_height + 0.5,
                target_height - 0.5,
                target_height + 1.0,
            ]
        };

        let is_valid = |candidate: Vec3| -> bool {
            let found_diff = candidate.y - my_height;
            let valid_height = if jumping_up {
                found_diff >= stats.min_height_diff_for_jump && found_diff <= max_height
            } else {
                found_diff <= -stats.min_height_diff_for_jump && found_diff.abs() <= MAX_FALL_HEIGHT
            };
            valid_height && horizontal_distance(ctx.position, candidate) <= max_distance
        };

        let mut best: Option<(f32, Vec3)> = None;

        for distance in LANDING_SEARCH_DISTANCES {
            if distance > max_distance {
                continue;
            }

            for height in search_heights {
                let mut probe = ctx.position + direction * distance;
                probe.y = height;

                let Some(candidate) = ctx.world.sample_walkable(probe, SETTLE_RADIUS) else {
                    continue;
                };
                if !is_valid(candidate) {
                    continue;
                }

                let score = -(candidate.y - target_height).abs() * 2.0
                    - horizontal_distance(ctx.position, candidate) * 0.3;

                if best.map_or(true, |(best_score, _)| score > best_score) {
                    best = Some((score, candidate));
                }
            }
        }

        if let Some((_, landing)) = best {
            return Some(landing);
        }

        // Fallback: snap прямо у проекции цели
        let ground = self.target_ground?;
        ctx.world
            .sample_walkable(ground, LANDING_FALLBACK_RADIUS)
            .filter(|candidate| is_valid(*candidate))
    }

    /// TryStartJump: посадка → проверки → скорость → сессия.
    ///
    /// Любой провал ставит `JUMP_FAIL_COOLDOWN`.
    pub fn try_start(&mut self, ctx: &JumpContext) -> Result<JumpPlan, JumpRejection> {
        let stats = ctx.stats;

        let Some(landing) = self.find_landing(ctx) else {
            self.cooldown = JUMP_FAIL_COOLDOWN;
            return Err(JumpRejection::NoLandingFound);
        };

        let height_diff = landing.y - ctx.position.y;
        let kind = if height_diff > 0.0 { JumpKind::Up } else { JumpKind::Down };

        if height_diff.abs() < stats.min_height_diff_for_jump {
            self.cooldown = JUMP_FAIL_COOLDOWN;
            return Err(JumpRejection::LandingTooFlat);
        }

        if kind == JumpKind::Up {
            let ceiling = ctx.world.raycast(
                ctx.position + Vec3::Y * 0.1,
                Vec3::Y,
                stats.max_jump_height(),
            );
            if ceiling.is_some() {
                self.cooldown = JUMP_FAIL_COOLDOWN;
                return Err(JumpRejection::ObstructedOverhead);
            }
        }

        let direction = horizontal_direction(ctx.position, landing)
            .unwrap_or_else(|| fallback_direction(ctx.forward));
        let velocity = direction * stats.jump_horizontal_speed + Vec3::Y * stats.jump_force;
        let flight_time = physics::flight_time(stats.jump_force, height_diff);

        let phase = if stats.jump_windup > 0.0 {
            JumpPhase::Preparing {
                remaining: stats.jump_windup,
            }
        } else {
            JumpPhase::Airborne
        };

        self.cooldown = JUMP_COOLDOWN;
        self.session = Some(JumpSession {
            start: ctx.position,
            landing,
            velocity,
            target_height: self.target_point(ctx.target).y,
            phase,
            flight_time,
        });

        Ok(JumpPlan {
            kind,
            landing,
            velocity,
            flight_time,
        })
    }

    /// Один Trace-тик: проекция цели → решение → старт → stuck detection
    pub fn plan_during_trace(&mut self, ctx: &JumpContext, delta: f32) -> Option<JumpPlan> {
        self.refresh_target_ground(&ctx.world, ctx.target, ctx.position.y);

        let plan = match self.evaluate(ctx) {
            Ok(kind) => match self.try_start(ctx) {
                Ok(plan) => {
                    crate::logger::log(&format!(
                        "🦘 Jump start ({:?}): landing {:?}, flight {:.2}s",
                        kind, plan.landing, plan.flight_time
                    ));
                    Some(plan)
                }
                Err(reason) => {
                    crate::logger::log(&format!("🚫 Jump aborted ({:?}): {}", kind, reason));
                    None
                }
            },
            Err(_) => None,
        };

        self.update_stuck(ctx.position, delta);
        plan
    }

    /// Копит stuck timer, пока позиция не сдвинулась на `STUCK_EPSILON`
    pub fn update_stuck(&mut self, position: Vec3, delta: f32) {
        let Some(last) = self.last_position else {
            self.last_position = Some(position);
            return;
        };

        if position.distance(last) < STUCK_EPSILON {
            self.stuck_timer += delta;
        } else {
            self.stuck_timer = 0.0;
            self.last_position = Some(position);
        }
    }

    pub fn reset_stuck(&mut self, position: Vec3) {
        self.stuck_timer = 0.0;
        self.last_position = Some(position);
    }
}

fn fallback_direction(forward: Vec3) -> Vec3 {
    let flat = flatten(forward);
    if flat.length_squared() > f32::EPSILON {
        flat.normalize()
    } else {
        Vec3::NEG_Z
    }
}
