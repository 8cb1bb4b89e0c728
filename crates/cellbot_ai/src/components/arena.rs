//! Arena компоненты: cells (food, virus, ejected mass, player cells)
//!
//! Эти entity принадлежат хосту (физика, спавн, коллизии).
//! Бот их только читает через Perception Adapter.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Тип cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum CellKind {
    /// Cell участника (человек или бот)
    PlayerCell,
    /// Food fragment (неподвижная еда)
    Food,
    /// Virus (дробит большие cells)
    Virus,
    /// Ejected mass pellet
    EjectedMass,
}

/// Cell на арене
///
/// Автоматически добавляет ArenaPosition через Required Components.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(ArenaPosition)]
pub struct Cell {
    pub kind: CellKind,
    /// Радиус
    pub size: f32,
    pub mass: f32,
}

impl Cell {
    pub fn new(kind: CellKind, size: f32, mass: f32) -> Self {
        Self { kind, size, mass }
    }

    /// Cell с радиусом, согласованным с массой (size = √(100·mass), формула хоста)
    pub fn from_mass(kind: CellKind, mass: f32) -> Self {
        Self {
            kind,
            size: (mass * 100.0).sqrt(),
            mass,
        }
    }
}

/// Позиция в мире арены (2D)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ArenaPosition(pub Vec2);

/// Владелец cell (participant entity). Нет компонента: ничья материя
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct CellOwner(pub Entity);

/// Marker: mother cell вариант вируса
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct MotherCell;

/// Текущая скорость cell (опционально, хост может не сообщать)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct CellSpeed(pub f32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mass_matches_host_formula() {
        let cell = Cell::from_mass(CellKind::PlayerCell, 100.0);
        assert_eq!(cell.size, 100.0);

        let pellet = Cell::from_mass(CellKind::EjectedMass, 16.0);
        assert_eq!(pellet.size, 40.0);
    }
}
