//! Bot AI: решение бота на каждый тик
//!
//! Модули:
//! - threat: препятствия и угрозы
//! - split_kill: достанет ли split-атака
//! - planner: potential field + split-kill добыча
//! - team: промоушен в команду и командный цикл
//! - brain: состояние бота и порядок тика
//! - systems: ECS обвязка (FixedUpdate, chain)

use bevy::prelude::*;

pub mod brain;
pub mod events;
pub mod planner;
pub mod split_kill;
pub mod systems;
pub mod team;
pub mod threat;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export основных типов
pub use brain::{AssistMode, BotActions, BotBrain, Pursuit, TeamState, TickContext};
pub use events::{
    EjectRequested, NoticeKind, PelletEaten, RemoveRequested, RespawnRequested, SplitRequested, TeamNotice,
};
pub use team::{Feeder, TeamRoster};

use crate::components::{CellColor, Participant};
use crate::config::{ArenaClock, ArenaConfig, BotTuning};

/// Bot participant со всем, что нужно системам
pub fn bot_bundle(stable_id: u64, color: CellColor) -> impl Bundle {
    (
        Participant::bot(stable_id),
        color,
        BotBrain::new(color),
        BotTuning::default(),
    )
}

/// Bot Plugin
///
/// Регистрирует события и bot системы в FixedUpdate для детерминизма.
/// Порядок выполнения:
/// 1. advance_arena_clock: ArenaClock += fixed timestep
/// 2. bot_consume_pellets: промоушен в команду
/// 3. bot_think: решение каждого бота
/// 4. sync_bot_intents: BotBrain.mouse → MouseIntent
pub struct BotPlugin;

impl Plugin for BotPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArenaConfig>()
            .init_resource::<ArenaClock>()
            .add_event::<PelletEaten>()
            .add_event::<SplitRequested>()
            .add_event::<EjectRequested>()
            .add_event::<RemoveRequested>()
            .add_event::<RespawnRequested>()
            .add_event::<TeamNotice>()
            .add_systems(
                FixedUpdate,
                (
                    systems::advance_arena_clock,
                    systems::bot_consume_pellets,
                    systems::bot_think,
                    systems::sync_bot_intents,
                )
                    .chain(), // Последовательное выполнение для детерминизма
            );
    }
}
