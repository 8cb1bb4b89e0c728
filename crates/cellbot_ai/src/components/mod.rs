//! ECS Components арены (принадлежат хосту, бот их читает)
//!
//! Организация по доменам:
//! - arena: cells (Cell, CellKind, ArenaPosition, CellOwner, MotherCell, CellSpeed)
//! - participant: участники (Participant, OwnedCells, MouseIntent, ViewBox, Connection, CellColor)

pub mod arena;
pub mod participant;

// Re-exports для удобного импорта
pub use arena::*;
pub use participant::*;
