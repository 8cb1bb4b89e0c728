//! Промоушен в команду по съеденным pellets

use bevy::prelude::*;

use crate::ai::brain::BotBrain;
use crate::ai::events::PelletEaten;
use crate::ai::team::{Feeder, TeamRoster};
use crate::components::{CellColor, Participant};
use crate::config::{ArenaClock, BotTuning};

use super::BotOutputs;

/// System: PelletEaten → BotBrain::on_pellet_eaten
///
/// Roster собирается из всех ботов один раз и обновляется после каждого bond,
/// поэтому два бота не займут одного участника даже в одном тике.
/// Pellets, съеденные людьми, игнорируются.
pub fn bot_consume_pellets(
    clock: Res<ArenaClock>,
    mut pellets: EventReader<PelletEaten>,
    mut bots: Query<(Entity, &mut BotBrain, &BotTuning)>,
    feeders: Query<(&Participant, &CellColor)>,
    mut outputs: BotOutputs,
) {
    let mut roster = TeamRoster::from_bonds(bots.iter().map(|(entity, brain, _)| (entity, brain.teammate())));

    for pellet in pellets.read() {
        let Ok((_, mut brain, tuning)) = bots.get_mut(pellet.eater) else {
            continue;
        };
        let Ok((participant, color)) = feeders.get(pellet.feeder) else {
            crate::log_warning(&format!("⚠️ Pellet from unknown feeder {:?}, ignored", pellet.feeder));
            continue;
        };

        let feeder = Feeder {
            entity: pellet.feeder,
            stable_id: participant.stable_id,
            color: *color,
        };
        let actions = brain.on_pellet_eaten(
            pellet.eater,
            &feeder,
            pellet.ejected_at_ms,
            clock.now_ms,
            tuning,
            &mut roster,
        );
        outputs.emit(pellet.eater, &actions);
    }
}
