//! ECS → ArenaSnapshot (один раз на тик, до любых решений ботов)

use bevy::ecs::query::Has;
use bevy::prelude::*;

use super::{ArenaSnapshot, ParticipantRecord, ViewNode};
use crate::components::{
    ArenaPosition, Cell, CellColor, CellOwner, CellSpeed, Connection, MotherCell, MouseIntent, OwnedCells,
    Participant, ViewBox,
};

/// Query data для cells арены
pub type CellData = (
    Entity,
    &'static Cell,
    &'static ArenaPosition,
    Option<&'static CellOwner>,
    Has<MotherCell>,
    Option<&'static CellSpeed>,
);

/// Query data для participants
pub type ParticipantData = (
    Entity,
    &'static Participant,
    &'static OwnedCells,
    &'static ArenaPosition,
    &'static MouseIntent,
    &'static ViewBox,
    &'static Connection,
    &'static CellColor,
);

/// Собрать снимок арены из ECS queries
pub fn capture_arena(cells: &Query<CellData>, participants: &Query<ParticipantData>) -> ArenaSnapshot {
    let nodes: Vec<ViewNode> = cells
        .iter()
        .map(|(entity, cell, position, owner, is_mother, speed)| ViewNode {
            entity,
            kind: cell.kind,
            position: position.0,
            size: cell.size,
            mass: cell.mass,
            owner: owner.map(|o| o.0),
            owner_is_bot: false, // резолвится в ArenaSnapshot::build
            is_mother,
            speed: speed.map(|s| s.0),
        })
        .collect();

    let records: Vec<ParticipantRecord> = participants
        .iter()
        .map(
            |(entity, participant, owned, position, mouse, view, connection, color)| ParticipantRecord {
                entity,
                stable_id: participant.stable_id,
                is_bot: participant.is_bot,
                connected: connection.connected,
                close_requested: connection.close_requested,
                owned: owned.0.clone(),
                raw_position: position.0,
                mouse: mouse.0,
                view: *view,
                color: *color,
            },
        )
        .collect();

    ArenaSnapshot::build(records, nodes)
}
