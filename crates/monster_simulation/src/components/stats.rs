//! MonsterStats — конфигурация монстра (read-only для всех подсистем)
//!
//! Загружается хостом до спавна (TOML или код). `#[serde(default)]` —
//! в файле можно указывать только отличающиеся от дефолта поля.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::physics;

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Failed to parse monster stats: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid stat '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Параметры дропа лута при смерти
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct LootTable {
    /// Вероятность дропа (0..=1)
    pub drop_chance: f32,
    /// Высота точки спавна над агентом
    pub drop_height: f32,
    /// Количество предметов (включительно)
    pub count_min: u32,
    pub count_max: u32,
}

impl Default for LootTable {
    fn default() -> Self {
        Self {
            drop_chance: 0.5,
            drop_height: 1.5,
            count_min: 3,
            count_max: 7,
        }
    }
}

#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct MonsterStats {
    pub max_health: f32,
    /// Скорость преследования (m/s)
    pub move_speed: f32,
    /// Скорость патруля (m/s)
    pub patrol_speed: f32,
    pub detect_distance: f32,
    pub attack_distance: f32,
    /// Интервал между атаками (секунды)
    pub attack_speed: f32,
    pub damage: f32,
    pub invincibility_duration: f32,

    // Knockback
    pub knockback_force: f32,
    /// Скорость затухания (lerp к нулю с коэффициентом decay·dt)
    pub knockback_decay: f32,
    /// Максимальная длительность (safety valve)
    pub knockback_duration: f32,

    // Patrol
    pub patrol_radius: f32,
    pub patrol_wait_time: f32,

    // Jump
    /// Начальная вертикальная скорость прыжка
    pub jump_force: f32,
    pub jump_horizontal_speed: f32,
    pub min_height_diff_for_jump: f32,
    /// Сколько секунд без движения = "застрял"
    pub stuck_threshold: f32,
    /// Телеграф перед прыжком (0 = сразу в воздух)
    pub jump_windup: f32,

    pub loot: LootTable,
}

impl Default for MonsterStats {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            move_speed: 3.5,
            patrol_speed: 1.5,
            detect_distance: 10.0,
            attack_distance: 1.5,
            attack_speed: 1.5,
            damage: 10.0,
            invincibility_duration: 0.1,
            knockback_force: 5.0,
            knockback_decay: 5.0,
            knockback_duration: 0.3,
            patrol_radius: 6.0,
            patrol_wait_time: 2.0,
            jump_force: 10.0,
            jump_horizontal_speed: 5.0,
            min_height_diff_for_jump: 0.5,
            stuck_threshold: 0.5,
            jump_windup: 0.0,
            loot: LootTable::default(),
        }
    }
}

impl MonsterStats {
    /// Парсинг + валидация
    pub fn from_toml_str(source: &str) -> Result<Self, StatsError> {
        let stats: MonsterStats = toml::from_str(source)?;
        stats.validate()?;
        Ok(stats)
    }

    pub fn validate(&self) -> Result<(), StatsError> {
        let positive = [
            ("max_health", self.max_health),
            ("move_speed", self.move_speed),
            ("patrol_speed", self.patrol_speed),
            ("detect_distance", self.detect_distance),
            ("attack_distance", self.attack_distance),
            ("attack_speed", self.attack_speed),
            ("knockback_duration", self.knockback_duration),
            ("jump_force", self.jump_force),
            ("jump_horizontal_speed", self.jump_horizontal_speed),
        ];

        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(StatsError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {}", value),
                });
            }
        }

        let non_negative = [
            ("damage", self.damage),
            ("invincibility_duration", self.invincibility_duration),
            ("knockback_force", self.knockback_force),
            ("knockback_decay", self.knockback_decay),
            ("patrol_radius", self.patrol_radius),
            ("patrol_wait_time", self.patrol_wait_time),
            ("min_height_diff_for_jump", self.min_height_diff_for_jump),
            ("stuck_threshold", self.stuck_threshold),
            ("jump_windup", self.jump_windup),
            ("loot.drop_height", self.loot.drop_height),
        ];

        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(StatsError::Invalid {
                    field,
                    reason: format!("must be non-negative, got {}", value),
                });
            }
        }

        if self.attack_distance >= self.detect_distance {
            return Err(StatsError::Invalid {
                field: "attack_distance",
                reason: format!(
                    "must be less than detect_distance ({} >= {})",
                    self.attack_distance, self.detect_distance
                ),
            });
        }

        if !(0.0..=1.0).contains(&self.loot.drop_chance) {
            return Err(StatsError::Invalid {
                field: "loot.drop_chance",
                reason: format!("must be within [0, 1], got {}", self.loot.drop_chance),
            });
        }

        if self.loot.count_min > self.loot.count_max {
            return Err(StatsError::Invalid {
                field: "loot.count_min",
                reason: format!(
                    "must not exceed count_max ({} > {})",
                    self.loot.count_min, self.loot.count_max
                ),
            });
        }

        Ok(())
    }

    /// Максимальная высота прыжка: F² / 2g
    pub fn max_jump_height(&self) -> f32 {
        physics::max_jump_height(self.jump_force)
    }

    /// Горизонтальный envelope прыжка вверх/на ту же высоту
    pub fn max_jump_distance(&self) -> f32 {
        physics::max_jump_distance(self.jump_force, self.jump_horizontal_speed)
    }

    /// Горизонтальный envelope прыжка вниз на `fall_height`
    pub fn max_fall_distance(&self, fall_height: f32) -> f32 {
        physics::max_fall_distance(self.jump_force, self.jump_horizontal_speed, fall_height)
    }
}
