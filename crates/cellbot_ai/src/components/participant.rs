//! Participant компоненты: игроки и боты
//!
//! Participant: entity-"трекер" участника (не cell). Cells ссылаются на него через CellOwner,
//! а он перечисляет свои cells в OwnedCells.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::ArenaPosition;

/// Участник арены (человек или бот)
///
/// `stable_id` переживает смерть/респавн: по нему бот находит тиммейта снова.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(OwnedCells, MouseIntent, ViewBox, Connection, CellColor, ArenaPosition)]
pub struct Participant {
    pub stable_id: u64,
    pub is_bot: bool,
}

impl Participant {
    pub fn human(stable_id: u64) -> Self {
        Self { stable_id, is_bot: false }
    }

    pub fn bot(stable_id: u64) -> Self {
        Self { stable_id, is_bot: true }
    }
}

/// Cells участника (exclusive ownership на стороне хоста)
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct OwnedCells(pub Vec<Entity>);

/// Точка прицела ("mouse"): единственный steering сигнал для физики
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MouseIntent(pub Vec2);

/// Половинные размеры области видимости участника
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ViewBox {
    pub half_width: f32,
    pub half_height: f32,
}

impl Default for ViewBox {
    fn default() -> Self {
        Self {
            half_width: 960.0,
            half_height: 540.0,
        }
    }
}

/// Состояние соединения участника
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Connection {
    pub connected: bool,
    /// Хост попросил закрыть соединение (бот должен убрать себя)
    pub close_requested: bool,
}

impl Default for Connection {
    fn default() -> Self {
        Self {
            connected: true,
            close_requested: false,
        }
    }
}

/// Цвет cells участника (визуальный маркер)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
pub struct CellColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl CellColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}
