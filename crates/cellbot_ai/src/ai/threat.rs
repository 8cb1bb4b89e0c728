//! Threat & Obstacle Assessor
//!
//! Геометрические/временные запросы над view:
//! - obstacle_in_path: блокирует ли вирус/вражеский бот прямой путь
//! - ThreatMemory + analyze_self_threats: опасные соседи с памятью на 1.5s
//! - analyze_threats / is_player_chasing: грубые триггеры для защитного кормления

use bevy::prelude::*;
use std::collections::HashMap;

use crate::components::CellKind;
use crate::geometry::point_segment_distance;
use crate::perception::{ParticipantSnapshot, ParticipantView, ViewNode};

/// Первое препятствие на отрезке `from → to`
///
/// Пропускает свою материю и материю тиммейта. Препятствие: вирус или cell другого бота,
/// чей радиус больше расстояния от центра до отрезка.
pub fn obstacle_in_path<'a>(
    view: &'a [ViewNode],
    me: Entity,
    teammate: Option<Entity>,
    from: Vec2,
    to: Vec2,
) -> Option<&'a ViewNode> {
    view.iter().find(|cell| {
        if cell.owner.is_some() && (cell.owner == Some(me) || cell.owner == teammate) {
            return false;
        }
        let blocking_kind = cell.kind == CellKind::Virus || (cell.owner.is_some() && cell.owner_is_bot);
        blocking_kind && point_segment_distance(from, to, cell.position) < cell.size
    })
}

/// Память недавних угроз: entity → timestamp (ms)
///
/// Принадлежит боту эксклюзивно. Чистится лениво при каждом анализе;
/// удалённые entity просто стареют и выпадают по окну.
#[derive(Debug, Clone, Default)]
pub struct ThreatMemory {
    seen: HashMap<Entity, u64>,
}

impl ThreatMemory {
    /// Максимум записей (при переполнении выкидываем самую старую)
    pub const CAPACITY: usize = 64;

    pub fn record(&mut self, threat: Entity, now_ms: u64) {
        if !self.seen.contains_key(&threat) && self.seen.len() >= Self::CAPACITY {
            let oldest = self
                .seen
                .iter()
                .min_by_key(|(entity, &at)| (at, entity.index()))
                .map(|(&entity, _)| entity);
            if let Some(oldest) = oldest {
                self.seen.remove(&oldest);
            }
        }
        self.seen.insert(threat, now_ms);
    }

    /// Удалить записи старше окна
    pub fn purge(&mut self, now_ms: u64, window_ms: u64) {
        self.seen.retain(|_, &mut at| now_ms.saturating_sub(at) <= window_ms);
    }

    /// Была ли хоть одна угроза за последние `window_ms`
    pub fn recently_threatened(&self, now_ms: u64, window_ms: u64) -> bool {
        self.seen
            .values()
            .any(|&at| now_ms.saturating_sub(at) <= window_ms)
    }

    #[cfg(test)]
    pub fn last_seen(&self, threat: Entity) -> Option<u64> {
        self.seen.get(&threat).copied()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Параметры анализа угроз для собственных cells
#[derive(Debug, Clone, Copy)]
pub struct SelfThreatRules {
    pub response_window_ms: u64,
    pub mass_ratio: f32,
    pub size_factor: f32,
}

/// Первая чужая cell, способная съесть одну из наших
///
/// Сначала чистит память, затем для каждой своей cell ищет чужую (не тиммейта)
/// с массой > mass_ratio × наша и дистанцией < size_factor × наш радиус.
/// Найденная угроза записывается в память.
pub fn analyze_self_threats(
    memory: &mut ThreatMemory,
    own_cells: &[ViewNode],
    view: &[ViewNode],
    me: Entity,
    teammate: Option<Entity>,
    now_ms: u64,
    rules: SelfThreatRules,
) -> Option<Entity> {
    memory.purge(now_ms, rules.response_window_ms);

    for cell in own_cells {
        let threat = view.iter().find(|other| {
            other.is_hostile_to(me, teammate)
                && other.mass > cell.mass * rules.mass_ratio
                && cell.position.distance(other.position) < cell.size * rules.size_factor
        });
        if let Some(threat) = threat {
            memory.record(threat.entity, now_ms);
            return Some(threat.entity);
        }
    }
    None
}

/// Есть ли враждебная cell ближе `radius` к центру тиммейта
pub fn analyze_threats(
    view: &[ViewNode],
    me: Entity,
    teammate: &ParticipantSnapshot,
    radius: f32,
) -> bool {
    let center = teammate.center();
    view.iter()
        .any(|cell| cell.is_hostile_to(me, Some(teammate.entity)) && cell.position.distance(center) < radius)
}

/// Есть ли враждебная cell ближе `radius` к точке прицела тиммейта
pub fn is_player_chasing(
    view: &[ViewNode],
    me: Entity,
    teammate: &ParticipantSnapshot,
    radius: f32,
) -> bool {
    let aim = teammate.current_aim();
    view.iter()
        .any(|cell| cell.is_hostile_to(me, Some(teammate.entity)) && cell.position.distance(aim) < radius)
}
