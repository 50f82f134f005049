//! Monster AI module
//!
//! MonsterController FSM + handoff между подсистемами движения
//! (navigation / jump / knockback) и death sequence.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod patrol;
pub mod systems;

// Re-export основных типов
pub use components::{MonsterState, PatrolPhase};
pub use events::{JumpCompleted, JumpStarted, KnockbackCompleted};
pub use systems::{
    apply_jump_starts, apply_motion_completions, initialize_monsters, monster_fsm, update_jumps,
    update_knockback,
};

use crate::combat::{process_damage_requests, tick_monster_timers};
use crate::death::{advance_death_sequences, DeathSequence, DeathStarted, LootDropRequested, MonsterRemoved};
use crate::presentation::PresentationCue;
use crate::DeterministicRng;

/// Все системы монстров (внешние исполнители ставятся `.after(MonsterSet)`)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonsterSet;

/// Monster Plugin
///
/// Регистрирует monster системы в FixedUpdate одной цепочкой.
/// Порядок выполнения:
/// 1. initialize_monsters — clip lengths, проверка коллабораторов
/// 2. tick_monster_timers — invincibility + jump cooldown (до логики)
/// 3. process_damage_requests — ApplyDamage
/// 4. update_knockback — KnockbackController
/// 5. update_jumps — JumpExecutor
/// 6. apply_motion_completions — Jump → Trace, Knockback → Patrol
/// 7. monster_fsm — Idle/Patrol/Trace/Attack/Comeback (+ JumpPlanner)
/// 8. apply_jump_starts — Trace → Jump
/// 9. advance_death_sequences — DeathSequencer
pub struct MonsterPlugin;

impl Plugin for MonsterPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<JumpStarted>()
            .add_event::<JumpCompleted>()
            .add_event::<KnockbackCompleted>()
            .add_event::<PresentationCue>()
            .add_event::<DeathStarted>()
            .add_event::<LootDropRequested>()
            .add_event::<MonsterRemoved>()
            .init_resource::<DeterministicRng>()
            .register_type::<MonsterState>()
            .register_type::<DeathSequence>();

        app.add_systems(
            FixedUpdate,
            (
                // Фаза 1: инициализация + таймеры
                initialize_monsters,
                tick_monster_timers,
                // Фаза 2: урон (может прервать прыжок)
                process_damage_requests,
                // Фаза 3: физические подсистемы
                update_knockback,
                update_jumps,
                apply_motion_completions,
                // Фаза 4: решения
                monster_fsm,
                apply_jump_starts,
                // Фаза 5: смерть
                advance_death_sequences,
            )
                .chain() // Последовательное выполнение для детерминизма
                .in_set(MonsterSet),
        );
    }
}
