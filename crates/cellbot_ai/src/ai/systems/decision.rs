//! Тик решения ботов

use bevy::prelude::*;

use crate::ai::brain::{BotBrain, TickContext};
use crate::ai::team::TeamRoster;
use crate::components::MouseIntent;
use crate::config::{ArenaClock, ArenaConfig, BotTuning};
use crate::perception::capture::{CellData, ParticipantData};
use crate::perception::{capture_arena, ParticipantSnapshot};

use super::BotOutputs;

/// System: продвинуть ArenaClock на fixed timestep
pub fn advance_arena_clock(mut clock: ResMut<ArenaClock>, time: Res<Time<Fixed>>) {
    clock.advance(time.timestep().as_micros() as u64);
}

/// System: снимок арены → решение каждого бота → события
///
/// Боты обрабатываются по Entity index (детерминизм). Roster обновляется
/// после каждого бота, так что recovery видит bonds, сделанные раньше в этом тике.
pub fn bot_think(
    clock: Res<ArenaClock>,
    config: Res<ArenaConfig>,
    cells: Query<CellData>,
    participants: Query<ParticipantData>,
    mut bots: Query<(Entity, &mut BotBrain, &BotTuning)>,
    mut outputs: BotOutputs,
) {
    let arena = capture_arena(&cells, &participants);
    let mut roster = TeamRoster::from_bonds(bots.iter().map(|(entity, brain, _)| (entity, brain.teammate())));

    let mut order: Vec<Entity> = bots.iter().map(|(entity, _, _)| entity).collect();
    order.sort_by_key(|entity| entity.index());

    for bot in order {
        let Ok((_, mut brain, tuning)) = bots.get_mut(bot) else {
            continue;
        };
        let view = arena
            .participant(bot)
            .map(|me: &ParticipantSnapshot| arena.visible_to(me))
            .unwrap_or_default();

        let ctx = TickContext {
            me: bot,
            now_ms: clock.now_ms,
            arena: &arena,
            view: &view,
            config: &config,
            tuning,
            roster: &roster,
        };
        let actions = brain.tick(&ctx);
        roster.sync(bot, brain.teammate());
        outputs.emit(bot, &actions);
    }
}

/// System: прицел бота → MouseIntent (читает физика хоста)
pub fn sync_bot_intents(mut bots: Query<(&BotBrain, &mut MouseIntent)>) {
    for (brain, mut intent) in bots.iter_mut() {
        if intent.0 != brain.mouse {
            intent.0 = brain.mouse;
        }
    }
}
