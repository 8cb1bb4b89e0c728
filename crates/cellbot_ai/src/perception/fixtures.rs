//! Test fixtures: ArenaSnapshot без ECS World
//!
//! Entity создаются через `Entity::from_raw`, builder можно менять между "тиками"
//! и собирать снимок заново.

use bevy::prelude::*;

use super::{ArenaSnapshot, ParticipantRecord, ViewNode};
use crate::components::{CellColor, CellKind, ViewBox};

pub struct ArenaBuilder {
    next_index: u32,
    participants: Vec<ParticipantRecord>,
    cells: Vec<ViewNode>,
}

impl ArenaBuilder {
    pub fn new() -> Self {
        Self {
            next_index: 1,
            participants: Vec::new(),
            cells: Vec::new(),
        }
    }

    fn alloc(&mut self) -> Entity {
        let entity = Entity::from_raw(self.next_index);
        self.next_index += 1;
        entity
    }

    fn participant(&mut self, stable_id: u64, is_bot: bool) -> Entity {
        let entity = self.alloc();
        self.participants.push(ParticipantRecord {
            entity,
            stable_id,
            is_bot,
            connected: true,
            close_requested: false,
            owned: Vec::new(),
            raw_position: Vec2::ZERO,
            mouse: Vec2::ZERO,
            view: ViewBox::default(),
            color: CellColor::default(),
        });
        entity
    }

    pub fn human(&mut self, stable_id: u64) -> Entity {
        self.participant(stable_id, false)
    }

    pub fn bot(&mut self, stable_id: u64) -> Entity {
        self.participant(stable_id, true)
    }

    fn record_mut(&mut self, participant: Entity) -> &mut ParticipantRecord {
        self.participants
            .iter_mut()
            .find(|p| p.entity == participant)
            .expect("unknown participant")
    }

    fn push_cell(
        &mut self,
        kind: CellKind,
        position: Vec2,
        mass: f32,
        owner: Option<Entity>,
        is_mother: bool,
    ) -> Entity {
        let entity = self.alloc();
        self.cells.push(ViewNode {
            entity,
            kind,
            position,
            size: (mass * 100.0).sqrt(),
            mass,
            owner,
            owner_is_bot: false,
            is_mother,
            speed: None,
        });
        entity
    }

    pub fn player_cell(&mut self, owner: Entity, position: Vec2, mass: f32) -> Entity {
        let cell = self.push_cell(CellKind::PlayerCell, position, mass, Some(owner), false);
        self.record_mut(owner).owned.push(cell);
        cell
    }

    pub fn food(&mut self, position: Vec2) -> Entity {
        self.push_cell(CellKind::Food, position, 1.0, None, false)
    }

    pub fn food_with_mass(&mut self, position: Vec2, mass: f32) -> Entity {
        self.push_cell(CellKind::Food, position, mass, None, false)
    }

    pub fn virus(&mut self, position: Vec2, mass: f32) -> Entity {
        self.push_cell(CellKind::Virus, position, mass, None, false)
    }

    pub fn mother_cell(&mut self, position: Vec2, mass: f32) -> Entity {
        self.push_cell(CellKind::Virus, position, mass, None, true)
    }

    pub fn ejected(&mut self, position: Vec2, mass: f32, owner: Option<Entity>) -> Entity {
        self.push_cell(CellKind::EjectedMass, position, mass, owner, false)
    }

    /// Переопределить радиус cell (для геометрических тестов)
    pub fn set_size(&mut self, cell: Entity, size: f32) {
        if let Some(node) = self.cells.iter_mut().find(|c| c.entity == cell) {
            node.size = size;
        }
    }

    pub fn move_cell(&mut self, cell: Entity, position: Vec2) {
        if let Some(node) = self.cells.iter_mut().find(|c| c.entity == cell) {
            node.position = position;
        }
    }

    pub fn remove_cell(&mut self, cell: Entity) {
        self.cells.retain(|c| c.entity != cell);
        for p in self.participants.iter_mut() {
            p.owned.retain(|&e| e != cell);
        }
    }

    pub fn remove_participant(&mut self, participant: Entity) {
        let owned: Vec<Entity> = self.record_mut(participant).owned.clone();
        for cell in owned {
            self.remove_cell(cell);
        }
        self.participants.retain(|p| p.entity != participant);
    }

    pub fn own(&mut self, owner: Entity, cell: Entity) {
        self.record_mut(owner).owned.push(cell);
    }

    /// Entity, которой нет в арене (уже удалена)
    pub fn dangling_entity(&mut self) -> Entity {
        self.alloc()
    }

    pub fn set_raw_position(&mut self, participant: Entity, position: Vec2) {
        self.record_mut(participant).raw_position = position;
    }

    pub fn set_mouse(&mut self, participant: Entity, mouse: Vec2) {
        self.record_mut(participant).mouse = mouse;
    }

    pub fn set_color(&mut self, participant: Entity, color: CellColor) {
        self.record_mut(participant).color = color;
    }

    pub fn set_connected(&mut self, participant: Entity, connected: bool) {
        self.record_mut(participant).connected = connected;
    }

    pub fn set_close_requested(&mut self, participant: Entity) {
        self.record_mut(participant).close_requested = true;
    }

    pub fn build(&self) -> ArenaSnapshot {
        ArenaSnapshot::build(self.participants.clone(), self.cells.clone())
    }
}
