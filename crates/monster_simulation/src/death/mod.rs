//! DeathSequencer — кооперативная последовательность смерти
//!
//! AwaitingKnockback → (knockback закончился) → collision off, death cue, loot
//! → Lingering (death clip + 2s) → MonsterRemoved + despawn.
//!
//! Каждый шаг — один тик системы, никаких корутин.

use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

use crate::components::{LootTable, Monster, MonsterStats, NavAgent};
use crate::knockback::Knockback;
use crate::presentation::{CueTimings, MonsterCue, PresentationCue};
use crate::DeterministicRng;


/// Сколько тело лежит после окончания death клипа
pub const DEATH_LINGER: f32 = 2.0;

/// Смерть началась (лёгкий сигнал для хоста: выключить hurtbox, UI и т.д.)
#[derive(Event, Debug, Clone)]
pub struct DeathStarted {
    pub entity: Entity,
    pub position: Vec3,
}

/// Хосту: заспавнить один предмет лута
#[derive(Event, Debug, Clone)]
pub struct LootDropRequested {
    pub source: Entity,
    pub position: Vec3,
    pub index: u32,
    pub total: u32,
    /// Радиальное направление разлёта (горизонтальное, единичное)
    pub direction: Vec3,
}

/// Монстр удалён из мира (entity уже despawn'ится)
#[derive(Event, Debug, Clone)]
pub struct MonsterRemoved {
    pub entity: Entity,
    pub position: Vec3,
}

#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub enum DeathSequence {
    /// Ждём окончания knockback'а от смертельного удара
    AwaitingKnockback,
    /// Death клип + linger
    Lingering { remaining: f32 },
}

impl Default for DeathSequence {
    fn default() -> Self {
        Self::AwaitingKnockback
    }
}

/// Что нужно сделать в этом тике
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathStep {
    Wait,
    /// Knockback закончился: выключить коллизию, cue, лут
    Collapse,
    /// Время вышло: удалить
    Remove,
}

impl DeathSequence {
    pub fn advance(&mut self, knockback_active: bool, death_clip: f32, delta: f32) -> DeathStep {
        match self {
            Self::AwaitingKnockback => {
                if knockback_active {
                    return DeathStep::Wait;
                }
                *self = Self::Lingering {
                    remaining: death_clip.max(0.0) + DEATH_LINGER,
                };
                DeathStep::Collapse
            }
            Self::Lingering { remaining } => {
                *remaining -= delta;
                if *remaining <= 0.0 {
                    DeathStep::Remove
                } else {
                    DeathStep::Wait
                }
            }
        }
    }
}

/// Сколько предметов выпадает. 0 = бросок шанса не прошёл.
pub fn roll_loot<R: Rng + ?Sized>(table: &LootTable, rng: &mut R) -> u32 {
    let roll: f32 = rng.gen();
    if roll > table.drop_chance {
        return 0;
    }

    let min = table.count_min.min(table.count_max);
    let max = table.count_min.max(table.count_max);
    rng.gen_range(min..=max)
}

/// Направление i-го предмета из `total`: равномерно по кругу
pub fn radial_direction(index: u32, total: u32) -> Vec3 {
    if total == 0 {
        return Vec3::X;
    }
    let angle = TAU / total as f32 * index as f32;
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

/// Система: продвигает death sequence всех умирающих монстров
pub fn advance_death_sequences(
    mut commands: Commands,
    mut dying: Query<(
        Entity,
        &mut DeathSequence,
        &mut Monster,
        &mut NavAgent,
        &Knockback,
        &MonsterStats,
        &CueTimings,
        &Transform,
    )>,
    mut rng: ResMut<DeterministicRng>,
    mut cue_events: EventWriter<PresentationCue>,
    mut loot_events: EventWriter<LootDropRequested>,
    mut removed_events: EventWriter<MonsterRemoved>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for (entity, mut sequence, mut monster, mut agent, knockback, stats, timings, transform) in dying.iter_mut() {
        match sequence.advance(knockback.is_active(), timings.death_clip, delta) {
            DeathStep::Wait => {}
            DeathStep::Collapse => {
                monster.collision_enabled = false;
                agent.detach();

                cue_events.write(PresentationCue {
                    entity,
                    cue: MonsterCue::Death,
                });

                let total = roll_loot(&stats.loot, &mut rng.rng);
                let position = transform.translation + Vec3::Y * stats.loot.drop_height;
                for index in 0..total {
                    loot_events.write(LootDropRequested {
                        source: entity,
                        position,
                        index,
                        total,
                        direction: radial_direction(index, total),
                    });
                }

                crate::logger::log(&format!("⚰️ {:?} collapsed, dropping {} loot item(s)", entity, total));
            }
            DeathStep::Remove => {
                removed_events.write(MonsterRemoved {
                    entity,
                    position: transform.translation,
                });
                commands.entity(entity).despawn();
                crate::logger::log(&format!("🗑️ {:?} removed", entity));
            }
        }
    }
}
