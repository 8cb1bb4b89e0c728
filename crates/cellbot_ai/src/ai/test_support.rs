//! Test helpers: тик бота поверх ArenaBuilder снимка

use bevy::prelude::*;

use super::brain::{BotActions, BotBrain, TeamState, TickContext};
use super::team::TeamRoster;
use crate::components::CellColor;
use crate::config::{ArenaConfig, BotTuning};
use crate::perception::ArenaSnapshot;

pub const BOT_COLOR: CellColor = CellColor::rgb(200, 40, 40);
pub const HUMAN_COLOR: CellColor = CellColor::rgb(30, 160, 255);

/// Один тик с view из ViewBox бота
pub fn run_tick(brain: &mut BotBrain, arena: &ArenaSnapshot, me: Entity, now_ms: u64, config: &ArenaConfig) -> BotActions {
    run_tick_with_roster(brain, arena, me, now_ms, config, &TeamRoster::default())
}

/// Тик с bonds других ботов
pub fn run_tick_with_roster(
    brain: &mut BotBrain,
    arena: &ArenaSnapshot,
    me: Entity,
    now_ms: u64,
    config: &ArenaConfig,
    roster: &TeamRoster,
) -> BotActions {
    let tuning = BotTuning::default();
    let view = arena
        .participant(me)
        .map(|p| arena.visible_to(p))
        .unwrap_or_default();
    brain.tick(&TickContext {
        me,
        now_ms,
        arena,
        view: &view,
        config,
        tuning: &tuning,
        roster,
    })
}

/// Бот, уже состоящий в команде
pub fn teamed_brain(teammate: Entity, stable_id: u64) -> BotBrain {
    let mut brain = BotBrain::new(BOT_COLOR);
    brain.state = TeamState::teamed_with(teammate);
    brain.teammate_id = Some(stable_id);
    brain
}
