//! Split-Kill Predictor
//!
//! Достанет ли split-атака добычу на дистанции `distance`.
//! Все вызовы передают center-to-center дистанцию (floor 1.0 в planner).

use crate::components::CellKind;
use crate::config::ArenaConfig;
use crate::perception::ViewNode;

/// Запас на базовую скорость (30%)
pub const SPEED_MARGIN: f32 = 1.3;
/// Множитель дальности рывка от радиуса атакующего (size / √2 × 4.5)
pub const BURST_REACH_FACTOR: f32 = 4.5;

/// Максимальная дальность split-атаки
///
/// Virus: снаряд вируса минус половина нашего радиуса и радиус вируса.
/// Иначе: большее из (скорость split с запасом, рывок от собственного радиуса).
pub fn split_reach(attacker_size: f32, prey_kind: CellKind, prey_size: f32, config: &ArenaConfig) -> f32 {
    if prey_kind == CellKind::Virus {
        SPEED_MARGIN * config.virus_shot_speed - attacker_size / 2.0 - prey_size
    } else {
        (SPEED_MARGIN * config.player_split_speed)
            .max(attacker_size / std::f32::consts::SQRT_2 * BURST_REACH_FACTOR)
    }
}

/// true если split-атака гарантированно долетает до добычи
pub fn can_guarantee_split_kill(attacker_size: f32, prey: &ViewNode, distance: f32, config: &ArenaConfig) -> bool {
    split_reach(attacker_size, prey.kind, prey.size, config) >= distance
}
