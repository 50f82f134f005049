//! Presentation sink: cue события + длины клипов
//!
//! Симуляция не знает про AnimationTree. Она только говорит "играй cue"
//! (`PresentationCue`) и один раз при инициализации спрашивает длины клипов
//! через `ClipLibrary`.

use bevy::prelude::*;
use std::sync::Arc;

pub const HIT_CLIP: &str = "hit_reaction";
pub const JUMP_CLIP: &str = "jump";
pub const DEATH_CLIP: &str = "death";

const DEFAULT_HIT_CLIP_LENGTH: f32 = 1.0;
const DEFAULT_JUMP_CLIP_LENGTH: f32 = 1.0;
const DEFAULT_DEATH_CLIP_LENGTH: f32 = 3.5;

/// Cue для анимационного слоя (fire-and-forget)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum MonsterCue {
    IdleToTrace,
    PatrolToTrace,
    TraceToAttack,
    AttackToTrace,
    TraceToComeback,
    ComebackToTrace,
    ComebackToPatrol,
    /// Удар по цели
    Attack,
    /// Реакция на удар, скорость подогнана под длительность knockback'а
    Hit { playback_speed: f32 },
    /// Прыжок, скорость подогнана под ожидаемое время полёта
    TraceToJump { playback_speed: f32 },
    JumpLanded,
    Death,
}

#[derive(Event, Debug, Clone)]
pub struct PresentationCue {
    pub entity: Entity,
    pub cue: MonsterCue,
}

/// Источник длин анимационных клипов (engine side)
pub trait ClipLibrary: Send + Sync {
    fn clip_length(&self, clip: &str) -> Option<f32>;
}

#[derive(Resource, Clone)]
pub struct Clips(pub Arc<dyn ClipLibrary>);

/// Фиксированная таблица длин (headless / тесты)
#[derive(Debug, Clone, Default)]
pub struct ClipTable {
    lengths: Vec<(String, f32)>,
}

impl ClipTable {
    pub fn with_clip(mut self, name: &str, length: f32) -> Self {
        self.lengths.push((name.to_string(), length));
        self
    }
}

impl ClipLibrary for ClipTable {
    fn clip_length(&self, clip: &str) -> Option<f32> {
        self.lengths
            .iter()
            .find(|(name, _)| name == clip)
            .map(|(_, length)| *length)
    }
}

/// Длины клипов монстра (запрашиваются один раз при инициализации)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CueTimings {
    pub hit_clip: f32,
    pub jump_clip: f32,
    pub death_clip: f32,
}

impl Default for CueTimings {
    fn default() -> Self {
        Self {
            hit_clip: DEFAULT_HIT_CLIP_LENGTH,
            jump_clip: DEFAULT_JUMP_CLIP_LENGTH,
            death_clip: DEFAULT_DEATH_CLIP_LENGTH,
        }
    }
}

impl CueTimings {
    /// Заполняет из библиотеки; отсутствующие клипы остаются дефолтными.
    /// Возвращает имена не найденных клипов (для warning'а).
    pub fn from_library(library: &dyn ClipLibrary) -> (Self, Vec<&'static str>) {
        let mut timings = Self::default();
        let mut missing = Vec::new();

        let slots: [(&'static str, &mut f32); 3] = [
            (HIT_CLIP, &mut timings.hit_clip),
            (JUMP_CLIP, &mut timings.jump_clip),
            (DEATH_CLIP, &mut timings.death_clip),
        ];

        for (name, slot) in slots {
            match library.clip_length(name) {
                Some(length) if length > 0.0 => *slot = length,
                _ => missing.push(name),
            }
        }

        (timings, missing)
    }

    /// Скорость hit клипа, чтобы он уложился в knockback
    pub fn hit_playback_speed(&self, knockback_duration: f32) -> f32 {
        playback_speed(self.hit_clip, knockback_duration)
    }

    /// Скорость jump клипа под реальное время полёта
    pub fn jump_playback_speed(&self, flight_time: f32) -> f32 {
        playback_speed(self.jump_clip, flight_time)
    }
}

fn playback_speed(clip_length: f32, duration: f32) -> f32 {
    if duration > 0.0 {
        clip_length / duration
    } else {
        1.0
    }
}
