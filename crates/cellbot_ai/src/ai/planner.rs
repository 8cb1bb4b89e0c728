//! Potential-Field Planner
//!
//! Каждая видимая cell даёт скалярное influence (+ притягивает, − отталкивает),
//! вектор к ней с весом influence / дистанция суммируется. Тиммейт добавляет
//! притяжение к своей предсказанной позиции. Итог нормализуется и масштабируется
//! на ширину ViewBox.
//!
//! Параллельно ищется split-kill добыча; если найдена: бот целится в неё,
//! делает split и держит прицел pursuit-окно.

use bevy::prelude::*;

use super::brain::{BotActions, BotBrain, Pursuit, TickContext};
use super::split_kill::can_guarantee_split_kill;
use super::team::predict_teammate_position;
use crate::components::CellKind;
use crate::config::ArenaConfig;
use crate::perception::{ParticipantSnapshot, ParticipantView, ViewNode};

/// Во сколько раз одна cell должна быть больше другой, чтобы её съесть
pub const SIZE_EDGE: f32 = 1.3;
/// Influence вражеских ботов, когда мы в команде
pub const TEAM_BOT_INFLUENCE: f32 = 2.5;

/// Вход potential field (без ссылок на BotBrain, чтобы тестировать отдельно)
pub struct FieldInput<'a> {
    pub me: Entity,
    /// Cell, от которой считаем поле (самая большая)
    pub cell: &'a ViewNode,
    pub view: &'a [ViewNode],
    pub teammate: Option<Entity>,
    /// Предсказанная позиция тиммейта
    pub teammate_target: Option<Vec2>,
    /// Cells меньше лимита
    pub can_split: bool,
    /// can_split + split cooldown истёк
    pub split_ready: bool,
    pub team_pull_weight: f32,
    pub config: &'a ArenaConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldOutcome {
    /// Единичный (или нулевой) вектор направления
    pub direction: Vec2,
    pub prey: Option<ViewNode>,
}

/// Influence одной видимой cell на нашу
pub fn influence(cell: &ViewNode, check: &ViewNode, teamed: bool, can_split: bool, view_log: f32) -> f32 {
    let bigger = cell.size > check.size * SIZE_EDGE;
    let smaller = check.size > cell.size * SIZE_EDGE;

    match check.kind {
        CellKind::PlayerCell if check.owner_is_bot && teamed => {
            if bigger {
                TEAM_BOT_INFLUENCE
            } else if smaller {
                -TEAM_BOT_INFLUENCE
            } else {
                0.0
            }
        }
        CellKind::PlayerCell => {
            if bigger {
                check.size / view_log
            } else if smaller {
                -(check.size / cell.size).ln()
            } else {
                -check.size / cell.size
            }
        }
        CellKind::Food => 1.0,
        CellKind::Virus => {
            if bigger {
                if can_split { -1.0 } else { 2.0 }
            } else if check.is_mother && smaller {
                -1.0
            } else {
                0.0
            }
        }
        CellKind::EjectedMass => {
            if bigger { 2.0 } else { 0.0 }
        }
    }
}

/// Суммарное поле + лучшая split-kill добыча
pub fn potential_field(input: &FieldInput) -> FieldOutcome {
    let cell = input.cell;
    let teamed = input.teammate.is_some();
    let view_log = match (input.view.len() as f32).ln() {
        l if l > 0.0 => l,
        _ => 1.0,
    };
    // Merge выключен → можно рубить добычу поменьше
    let min_prey_share = if input.config.merge_disabled() { 0.1 } else { 0.4 };

    let mut sum = Vec2::ZERO;
    let mut prey: Option<ViewNode> = None;

    for check in input.view {
        if check.entity == cell.entity || check.is_owned_by(input.me) {
            continue;
        }

        let weight = influence(cell, check, teamed, input.can_split, view_log);
        if weight == 0.0 {
            continue;
        }

        let displacement = check.position - cell.position;
        let mut distance = displacement.length();
        if weight < 0.0 {
            // Отталкивание считаем от края до края
            distance -= cell.size + check.size;
        }
        let distance = distance.max(1.0);
        sum += displacement.normalize_or_zero() * (weight / distance);

        let is_prey = input.split_ready
            && check.kind == CellKind::PlayerCell
            && check.is_hostile_to(input.me, input.teammate)
            && cell.size / SIZE_EDGE > SIZE_EDGE * check.size
            && cell.size * min_prey_share < check.size
            && can_guarantee_split_kill(cell.size, check, distance, input.config);
        if is_prey && prey.map_or(true, |p| check.size > p.size) {
            prey = Some(*check);
        }
    }

    if let Some(target) = input.teammate_target {
        sum += (target - cell.position).normalize_or_zero() * input.team_pull_weight;
    }

    FieldOutcome {
        direction: sum.normalize_or_zero(),
        prey,
    }
}

impl BotBrain {
    /// Solo / fallback поведение: follow priority → pursuit → potential field
    pub(crate) fn decide_behavior(
        &mut self,
        ctx: &TickContext,
        me: &ParticipantSnapshot,
        cell: &ViewNode,
        actions: &mut BotActions,
    ) {
        let teammate = self.teammate().and_then(|t| ctx.arena.participant(t));

        // Слишком далеко от тиммейта: только догоняем
        if let Some(mate) = teammate {
            if me.center().distance(mate.center()) > ctx.tuning.follow_priority_radius {
                self.mouse = predict_teammate_position(mate, ctx.tuning);
                return;
            }
        }

        if let Some(pursuit) = self.pursuit {
            match ctx.arena.cell(pursuit.target) {
                Some(target) if pursuit.ticks_left > 0 => {
                    self.pursuit = Some(Pursuit {
                        ticks_left: pursuit.ticks_left - 1,
                        ..pursuit
                    });
                    self.mouse = target.position;
                    return;
                }
                _ => self.pursuit = None,
            }
        }

        let can_split = me.cell_count() < ctx.config.player_max_cells;
        let field = potential_field(&FieldInput {
            me: ctx.me,
            cell,
            view: ctx.view,
            teammate: teammate.map(|m| m.entity),
            teammate_target: teammate.map(|m| predict_teammate_position(m, ctx.tuning)),
            can_split,
            split_ready: can_split && self.split_cooldown == 0,
            team_pull_weight: ctx.tuning.team_pull_weight,
            config: ctx.config,
        });

        self.mouse = cell.position + field.direction * me.view.half_width;

        if let Some(prey) = field.prey {
            self.mouse = prey.position;
            self.pursuit = Some(Pursuit {
                target: prey.entity,
                ticks_left: ctx.config.pursuit_ticks(),
            });
            self.split_cooldown = ctx.config.split_cooldown_ticks();
            actions.split();
            crate::log(&format!(
                "🎯 Bot {:?} split-kill on {:?} (size {:.0} vs {:.0})",
                ctx.me, prey.entity, cell.size, prey.size
            ));
        }
    }
}
