//! Bot Events: граница между ботом и хостом арены
//!
//! Input (хост → бот):
//! - PelletEaten: бот съел ejected pellet (промоушен в команду)
//!
//! Output (бот → хост):
//! - SplitRequested / EjectRequested: действия участника (как у человека)
//! - RemoveRequested / RespawnRequested: lifecycle бота
//! - TeamNotice: chat-сообщение тиммейту

use bevy::prelude::*;

/// Бот съел ejected pellet
///
/// `ejected_at_ms`: время выброса по ArenaClock. None: хост не знает,
/// такой pellet считается свежим.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PelletEaten {
    pub eater: Entity,
    /// Participant, который выбросил pellet
    pub feeder: Entity,
    pub ejected_at_ms: Option<u64>,
}

/// Участник просит split (один split на событие)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitRequested {
    pub participant: Entity,
}

/// Участник просит выбросить `count` pellets
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EjectRequested {
    pub participant: Entity,
    pub count: u32,
}

/// Бот закрыл соединение и должен быть убран с арены вместе со своими cells
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveRequested {
    pub participant: Entity,
}

/// У бота не осталось cells
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RespawnRequested {
    pub participant: Entity,
}

/// Тип командного уведомления
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// Бот впервые присоединился к игроку
    Joined,
    /// Бот нашёл тиммейта после его респавна
    Rejoined,
    /// Бот выбрал вражеского бота рядом с прицелом тиммейта
    TargetingEnemyBot,
}

impl NoticeKind {
    pub fn message(&self) -> &'static str {
        match self {
            NoticeKind::Joined => "I'm on your team now. Feed me and I'll cover you.",
            NoticeKind::Rejoined => "Found you again, back on your team.",
            NoticeKind::TargetingEnemyBot => "Going after the bot near your cursor.",
        }
    }
}

/// Сообщение бота тиммейту
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamNotice {
    /// Получатель
    pub to: Entity,
    /// Отправитель (бот)
    pub from: Entity,
    pub kind: NoticeKind,
}
