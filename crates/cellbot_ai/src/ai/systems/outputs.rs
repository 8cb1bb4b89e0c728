//! BotActions → события хосту + recolor через Commands

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::ai::brain::BotActions;
use crate::ai::events::{EjectRequested, RemoveRequested, RespawnRequested, SplitRequested, TeamNotice};

/// Все выходы бота одним SystemParam
#[derive(SystemParam)]
pub struct BotOutputs<'w, 's> {
    splits: EventWriter<'w, SplitRequested>,
    ejects: EventWriter<'w, EjectRequested>,
    removals: EventWriter<'w, RemoveRequested>,
    respawns: EventWriter<'w, RespawnRequested>,
    notices: EventWriter<'w, TeamNotice>,
    commands: Commands<'w, 's>,
}

impl BotOutputs<'_, '_> {
    pub fn emit(&mut self, bot: Entity, actions: &BotActions) {
        for _ in 0..actions.splits {
            self.splits.write(SplitRequested { participant: bot });
        }
        if actions.ejects > 0 {
            self.ejects.write(EjectRequested {
                participant: bot,
                count: actions.ejects,
            });
        }
        for notice in &actions.notices {
            crate::log(&format!("💬 {:?} → {:?}: {}", notice.from, notice.to, notice.kind.message()));
            self.notices.write(*notice);
        }
        if let Some(color) = actions.recolor {
            self.commands.entity(bot).insert(color);
        }
        if actions.remove_self {
            self.removals.write(RemoveRequested { participant: bot });
        } else if actions.respawn {
            self.respawns.write(RespawnRequested { participant: bot });
        }
    }
}
