//! Movement компоненты: navigation intent + motion authority

use bevy::prelude::*;

/// Кто сейчас пишет позицию агента.
///
/// Ровно одна подсистема владеет позицией в каждый тик:
/// - `Navigated` — path follower (engine NavigationAgent или headless follower)
/// - `Ballistic` — JumpExecutor
/// - `Knockback` — KnockbackController
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub enum MotionAuthority {
    #[default]
    Navigated,
    Ballistic,
    Knockback,
}

/// Navigation agent (high-level intent, исполняется navmesh follower'ом)
///
/// ECS пишет destination/stop/resume, исполнитель двигает Transform и
/// обновляет `remaining_distance`. Warp = прямая запись Transform + `reset_path`.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct NavAgent {
    /// Выключен на время knockback/jump (agent не трогает позицию)
    pub enabled: bool,
    pub destination: Option<Vec3>,
    /// Скорость движения (m/s)
    pub speed: f32,
    /// Дистанция, на которой агент считает цель достигнутой
    pub stopping_distance: f32,
    pub is_stopped: bool,
    /// Остаток пути; `INFINITY` пока исполнитель не посчитал
    pub remaining_distance: f32,
}

impl Default for NavAgent {
    fn default() -> Self {
        Self {
            enabled: true,
            destination: None,
            speed: 2.0,
            stopping_distance: 0.0,
            is_stopped: false,
            remaining_distance: f32::INFINITY,
        }
    }
}

impl NavAgent {
    pub fn set_destination(&mut self, destination: Vec3) {
        self.destination = Some(destination);
        self.is_stopped = false;
        self.remaining_distance = f32::INFINITY;
    }

    pub fn reset_path(&mut self) {
        self.destination = None;
        self.remaining_distance = f32::INFINITY;
    }

    /// Отключить агента (позиция передаётся ballistic/knockback)
    pub fn detach(&mut self) {
        self.enabled = false;
        self.is_stopped = true;
        self.reset_path();
    }

    /// Вернуть управление агенту после warp
    pub fn reattach(&mut self) {
        self.enabled = true;
        self.is_stopped = false;
        self.reset_path();
    }

    pub fn has_arrived(&self, threshold: f32) -> bool {
        self.destination.is_some() && self.remaining_distance < threshold
    }
}
