//! Perception Adapter: снимок арены на один тик
//!
//! Каждый тик из ECS собирается ArenaSnapshot (все cells + все participants).
//! View конкретного бота: cells, чьи круги пересекают его ViewBox; другой фильтрации нет.
//!
//! Entity ids из снимка: единственное, что бот хранит между тиками
//! (pursuit, threat memory, enemy target). Перед использованием они
//! перепроверяются через `ArenaSnapshot::cell()` / `participant()`.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::{CellColor, CellKind, ViewBox};
use crate::geometry::centroid;

pub mod capture;

pub use capture::capture_arena;

/// Видимая cell (пересобирается каждый тик)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewNode {
    pub entity: Entity,
    pub kind: CellKind,
    pub position: Vec2,
    pub size: f32,
    pub mass: f32,
    /// None: ничья материя (food, virus, бесхозные pellets)
    pub owner: Option<Entity>,
    pub owner_is_bot: bool,
    pub is_mother: bool,
    pub speed: Option<f32>,
}

impl ViewNode {
    pub fn is_owned_by(&self, participant: Entity) -> bool {
        self.owner == Some(participant)
    }

    /// Cell принадлежит участнику, который не `me` и не `teammate`
    pub fn is_hostile_to(&self, me: Entity, teammate: Option<Entity>) -> bool {
        match self.owner {
            Some(owner) => owner != me && Some(owner) != teammate,
            None => false,
        }
    }
}

/// Снимок участника на текущий тик
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipantSnapshot {
    pub entity: Entity,
    pub stable_id: u64,
    pub is_bot: bool,
    pub connected: bool,
    pub close_requested: bool,
    /// Живые cells участника (удалённые отброшены)
    pub cells: Vec<ViewNode>,
    /// Последняя позиция от хоста (fallback для центра без cells)
    pub raw_position: Vec2,
    pub mouse: Vec2,
    pub view: ViewBox,
    pub color: CellColor,
}

/// Capability interface участника с определёнными defaults
///
/// center без cells: raw position, largest_cell без cells: None, total_mass без cells: 0.
pub trait ParticipantView {
    fn center(&self) -> Vec2;
    fn largest_cell(&self) -> Option<&ViewNode>;
    fn total_mass(&self) -> f32;
    fn current_aim(&self) -> Vec2;
    fn cell_count(&self) -> usize;
}

impl ParticipantView for ParticipantSnapshot {
    fn center(&self) -> Vec2 {
        centroid(self.cells.iter().map(|c| c.position)).unwrap_or(self.raw_position)
    }

    fn largest_cell(&self) -> Option<&ViewNode> {
        self.cells
            .iter()
            .fold(None, |best: Option<&ViewNode>, cell| match best {
                Some(b) if b.mass >= cell.mass => Some(b),
                _ => Some(cell),
            })
    }

    fn total_mass(&self) -> f32 {
        self.cells.iter().map(|c| c.mass).sum()
    }

    fn current_aim(&self) -> Vec2 {
        self.mouse
    }

    fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// Снимок арены: cells в детерминированном порядке (по Entity index) + participants
#[derive(Debug, Clone, Default)]
pub struct ArenaSnapshot {
    cells: Vec<ViewNode>,
    cell_index: HashMap<Entity, usize>,
    participants: Vec<ParticipantSnapshot>,
    participant_index: HashMap<Entity, usize>,
}

/// Сырые данные участника (до привязки cells)
#[derive(Debug, Clone)]
pub struct ParticipantRecord {
    pub entity: Entity,
    pub stable_id: u64,
    pub is_bot: bool,
    pub connected: bool,
    pub close_requested: bool,
    pub owned: Vec<Entity>,
    pub raw_position: Vec2,
    pub mouse: Vec2,
    pub view: ViewBox,
    pub color: CellColor,
}

impl ArenaSnapshot {
    /// Собрать снимок
    ///
    /// `owner_is_bot` и списки cells участников вычисляются здесь, один раз на тик.
    pub fn build(participants: Vec<ParticipantRecord>, mut cells: Vec<ViewNode>) -> Self {
        let bots: HashMap<Entity, bool> = participants
            .iter()
            .map(|p| (p.entity, p.is_bot))
            .collect();

        // Сортируем по Entity index для детерминизма ("first match" семантика)
        cells.sort_by_key(|c| c.entity.index());
        for cell in cells.iter_mut() {
            cell.owner_is_bot = cell
                .owner
                .and_then(|owner| bots.get(&owner).copied())
                .unwrap_or(false);
        }
        let cell_index: HashMap<Entity, usize> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| (c.entity, i))
            .collect();

        let mut participants: Vec<ParticipantSnapshot> = participants
            .into_iter()
            .map(|record| ParticipantSnapshot {
                entity: record.entity,
                stable_id: record.stable_id,
                is_bot: record.is_bot,
                connected: record.connected,
                close_requested: record.close_requested,
                cells: record
                    .owned
                    .iter()
                    .filter_map(|e| cell_index.get(e).map(|&i| cells[i]))
                    .collect(),
                raw_position: record.raw_position,
                mouse: record.mouse,
                view: record.view,
                color: record.color,
            })
            .collect();
        participants.sort_by_key(|p| p.entity.index());
        let participant_index = participants
            .iter()
            .enumerate()
            .map(|(i, p)| (p.entity, i))
            .collect();

        Self {
            cells,
            cell_index,
            participants,
            participant_index,
        }
    }

    /// Cell, если она ещё существует
    pub fn cell(&self, entity: Entity) -> Option<&ViewNode> {
        self.cell_index.get(&entity).map(|&i| &self.cells[i])
    }

    pub fn is_present(&self, entity: Entity) -> bool {
        self.cell_index.contains_key(&entity)
    }

    pub fn participant(&self, entity: Entity) -> Option<&ParticipantSnapshot> {
        self.participant_index
            .get(&entity)
            .map(|&i| &self.participants[i])
    }

    /// Roster lookup по stable id (для восстановления bond после респавна)
    pub fn participant_by_stable_id(&self, stable_id: u64) -> Option<&ParticipantSnapshot> {
        self.participants.iter().find(|p| p.stable_id == stable_id)
    }

    pub fn participants(&self) -> &[ParticipantSnapshot] {
        &self.participants
    }

    pub fn cells(&self) -> &[ViewNode] {
        &self.cells
    }

    /// View участника: cells, пересекающие его ViewBox вокруг центра
    pub fn visible_to(&self, viewer: &ParticipantSnapshot) -> Vec<ViewNode> {
        let center = viewer.center();
        let half = Vec2::new(viewer.view.half_width, viewer.view.half_height);
        self.cells
            .iter()
            .filter(|cell| {
                let d = (cell.position - center).abs();
                d.x <= half.x + cell.size && d.y <= half.y + cell.size
            })
            .copied()
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures;

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_owner_is_bot_resolved_from_roster() {
        let mut arena = ArenaBuilder::new();
        let bot = arena.bot(1);
        let human = arena.human(2);
        let bot_cell = arena.player_cell(bot, Vec2::new(0.0, 0.0), 100.0);
        let human_cell = arena.player_cell(human, Vec2::new(50.0, 0.0), 100.0);
        let snapshot = arena.build();

        assert!(snapshot.cell(bot_cell).map(|c| c.owner_is_bot).unwrap_or(false));
        assert!(!snapshot.cell(human_cell).map(|c| c.owner_is_bot).unwrap_or(true));
    }

    #[test]
    fn test_participant_defaults_without_cells() {
        let mut arena = ArenaBuilder::new();
        let human = arena.human(7);
        arena.set_raw_position(human, Vec2::new(12.0, 34.0));
        let snapshot = arena.build();

        let p = snapshot.participant(human).expect("participant");
        assert_eq!(p.center(), Vec2::new(12.0, 34.0));
        assert!(p.largest_cell().is_none());
        assert_eq!(p.total_mass(), 0.0);
        assert_eq!(p.cell_count(), 0);
    }

    #[test]
    fn test_largest_cell_by_mass() {
        let mut arena = ArenaBuilder::new();
        let human = arena.human(1);
        arena.player_cell(human, Vec2::new(0.0, 0.0), 50.0);
        let big = arena.player_cell(human, Vec2::new(100.0, 0.0), 200.0);
        let snapshot = arena.build();

        let p = snapshot.participant(human).expect("participant");
        assert_eq!(p.largest_cell().map(|c| c.entity), Some(big));
        assert_eq!(p.total_mass(), 250.0);
        assert_eq!(p.center(), Vec2::new(50.0, 0.0));
    }

    #[test]
    fn test_visible_to_respects_view_box() {
        let mut arena = ArenaBuilder::new();
        let bot = arena.bot(1);
        arena.player_cell(bot, Vec2::ZERO, 100.0);
        let near = arena.food(Vec2::new(900.0, 0.0));
        let far = arena.food(Vec2::new(2000.0, 0.0));
        let edge = arena.virus(Vec2::new(0.0, 600.0), 100.0);
        let snapshot = arena.build();

        let me = snapshot.participant(bot).expect("bot");
        let view = snapshot.visible_to(me);
        let ids: Vec<Entity> = view.iter().map(|c| c.entity).collect();
        assert!(ids.contains(&near));
        assert!(!ids.contains(&far));
        // Круг вируса (size ~100) задевает край ViewBox (540)
        assert!(ids.contains(&edge));
    }

    #[test]
    fn test_removed_cells_are_absent() {
        let mut arena = ArenaBuilder::new();
        let human = arena.human(1);
        let ghost = arena.dangling_entity();
        arena.own(human, ghost);
        let snapshot = arena.build();

        assert!(!snapshot.is_present(ghost));
        assert_eq!(snapshot.participant(human).map(|p| p.cell_count()), Some(0));
    }
}
