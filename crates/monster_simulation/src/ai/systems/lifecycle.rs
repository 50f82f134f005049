//! Инициализация монстров (один раз, на `Added<Monster>`)

use bevy::prelude::*;

use crate::components::{Monster, MonsterStats, NavAgent};
use crate::jump::JumpController;
use crate::navigation::{WorldNavigation, WorldPhysics};
use crate::presentation::{Clips, CueTimings};

/// Система: clip lengths → CueTimings, проверка коллабораторов, статов.
///
/// Отсутствующий коллаборатор — warning и деградация (прыжки выключены),
/// не паника.
pub fn initialize_monsters(
    mut monsters: Query<
        (
            Entity,
            &Transform,
            &MonsterStats,
            &mut NavAgent,
            &mut JumpController,
            &mut CueTimings,
        ),
        Added<Monster>,
    >,
    clips: Option<Res<Clips>>,
    navigation: Option<Res<WorldNavigation>>,
    physics: Option<Res<WorldPhysics>>,
) {
    for (entity, transform, stats, mut agent, mut jump, mut timings) in monsters.iter_mut() {
        match clips.as_deref() {
            Some(clips) => {
                let (resolved, missing) = CueTimings::from_library(clips.0.as_ref());
                if !missing.is_empty() {
                    crate::logger::log_warning(&format!(
                        "⚠️ {:?}: clips {:?} not found, using default lengths",
                        entity, missing
                    ));
                }
                *timings = resolved;
            }
            None => {
                crate::logger::log_warning(&format!(
                    "⚠️ {:?}: no clip library, using default cue timings",
                    entity
                ));
            }
        }

        if navigation.is_none() {
            crate::logger::log_warning(&format!(
                "⚠️ {:?}: navigation is not available, jumping disabled",
                entity
            ));
            jump.enabled = false;
        }

        if physics.is_none() {
            crate::logger::log_warning(&format!(
                "⚠️ {:?}: physics queries are not available, landing relies on navmesh sampling",
                entity
            ));
        }

        if let Err(error) = stats.validate() {
            crate::logger::log_error(&format!("❌ {:?}: invalid stats: {}", entity, error));
        }

        agent.speed = stats.move_speed;
        jump.reset_stuck(transform.translation);

        crate::logger::log(&format!("👾 Monster {:?} initialized at {:?}", entity, transform.translation));
    }
}
