//! Team Bonding: промоушен в команду и командный цикл поддержки
//!
//! Промоушен: 10 свежих pellets подряд от одного участника → bond
//! (если этого участника ещё не занял другой бот).
//!
//! Командный цикл (по приоритету, первое сработавшее правило выигрывает):
//! 1. virus hunt: тиммейт маленький, рядом вирус
//! 2. активная охота на вражеского бота
//! 3. захват нового enemy bot около прицела тиммейта
//! 4. поддержка: escort → вирусы/фрагменты → combat feeding → normal feeding →
//!    сбор pellets → planner + фрагменты тиммейта + split-run

use bevy::prelude::*;
use std::collections::HashMap;

use super::brain::{AssistMode, BotActions, BotBrain, TeamState, TickContext};
use super::events::NoticeKind;
use super::split_kill::can_guarantee_split_kill;
use super::threat::{analyze_self_threats, analyze_threats, is_player_chasing, obstacle_in_path};
use crate::components::{CellColor, CellKind};
use crate::config::BotTuning;
use crate::geometry::avoidance_offset;
use crate::perception::{ParticipantSnapshot, ParticipantView, ViewNode};

/// Запас скорости тиммейта при предсказании позиции
pub const LOOKAHEAD_SPEED_FACTOR: f32 = 1.2;

/// Кто с кем в команде (bot → teammate)
///
/// Собирается из всех BotBrain перед обработкой pellets и обновляется на лету,
/// так что два бота не могут занять одного участника в один тик.
#[derive(Debug, Clone, Default)]
pub struct TeamRoster {
    bonds: HashMap<Entity, Entity>,
}

impl TeamRoster {
    pub fn from_bonds<I>(bonds: I) -> Self
    where
        I: IntoIterator<Item = (Entity, Option<Entity>)>,
    {
        Self {
            bonds: bonds
                .into_iter()
                .filter_map(|(bot, teammate)| teammate.map(|t| (bot, t)))
                .collect(),
        }
    }

    /// Участник уже в команде с другим ботом
    pub fn is_claimed_by_other(&self, participant: Entity, me: Entity) -> bool {
        self.bonds
            .iter()
            .any(|(&bot, &teammate)| bot != me && teammate == participant)
    }

    pub fn bond(&mut self, bot: Entity, teammate: Entity) {
        self.bonds.insert(bot, teammate);
    }

    /// Привести запись бота к его состоянию после тика
    pub fn sync(&mut self, bot: Entity, teammate: Option<Entity>) {
        match teammate {
            Some(teammate) => self.bond(bot, teammate),
            None => {
                self.bonds.remove(&bot);
            }
        }
    }

    pub fn teammate_of(&self, bot: Entity) -> Option<Entity> {
        self.bonds.get(&bot).copied()
    }
}

/// Кто выбросил съеденный pellet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Feeder {
    pub entity: Entity,
    pub stable_id: u64,
    pub color: CellColor,
}

/// Куда тиммейт будет через lookahead
///
/// t = min(dist(центр, прицел) / (скорость × 1.2), lookahead_cap).
pub fn predict_teammate_position(mate: &ParticipantSnapshot, tuning: &BotTuning) -> Vec2 {
    let center = mate.center();
    let delta = mate.current_aim() - center;
    let speed = mate
        .largest_cell()
        .and_then(|c| c.speed)
        .filter(|s| *s > 0.0)
        .unwrap_or(tuning.default_cell_speed);
    let t = (delta.length() / (speed * LOOKAHEAD_SPEED_FACTOR)).min(tuning.lookahead_cap);
    center + delta * t
}

fn nearest<'a, I>(cells: I, point: Vec2) -> Option<&'a ViewNode>
where
    I: Iterator<Item = &'a ViewNode>,
{
    cells.min_by(|a, b| {
        point
            .distance(a.position)
            .total_cmp(&point.distance(b.position))
    })
}

impl BotBrain {
    /// Бот съел pellet: считаем свежие кормления, на пороге: bond
    pub fn on_pellet_eaten(
        &mut self,
        me: Entity,
        feeder: &Feeder,
        ejected_at_ms: Option<u64>,
        now_ms: u64,
        tuning: &BotTuning,
        roster: &mut TeamRoster,
    ) -> BotActions {
        let mut actions = BotActions::default();
        if feeder.entity == me {
            return actions;
        }

        let freshness = tuning.bullet_freshness_ms;
        if self
            .last_bullet_ms
            .map_or(true, |at| now_ms.saturating_sub(at) > freshness)
        {
            self.bullets_fed = 0;
        }

        let teammate = self.teammate();
        let fresh = ejected_at_ms.map_or(true, |at| now_ms.saturating_sub(at) < freshness);
        if !fresh || teammate.is_some_and(|t| t != feeder.entity) {
            return actions;
        }

        self.bullets_fed += 1;
        self.last_bullet_ms = Some(now_ms);

        if self.bullets_fed >= tuning.feeds_to_bond
            && teammate.is_none()
            && !roster.is_claimed_by_other(feeder.entity, me)
        {
            self.state = TeamState::teamed_with(feeder.entity);
            self.teammate_id = Some(feeder.stable_id);
            self.teammate_cells_seen = None;
            roster.bond(me, feeder.entity);
            actions.recolor = Some(feeder.color);
            actions.notify(feeder.entity, me, NoticeKind::Joined);
            crate::log_info(&format!(
                "🤝 Bot {:?} joined {:?} after {} feeds",
                me, feeder.entity, self.bullets_fed
            ));
        }
        actions
    }

    /// Командный цикл (тиммейт подключён)
    pub(crate) fn team_behavior_cycle(
        &mut self,
        ctx: &TickContext,
        me: &ParticipantSnapshot,
        mate: &ParticipantSnapshot,
        actions: &mut BotActions,
    ) {
        if self.virus_hunt_for_team(ctx, me, mate, actions) {
            if me.center().distance(mate.center()) < ctx.tuning.virus_feed_radius {
                self.feed_player_mass(ctx, me, mate, actions);
            }
            return;
        }

        if let Some(target) = self.state.hunt() {
            if ctx.arena.is_present(target) {
                self.execute_targeted_attack(ctx, me, target, actions);
                return;
            }
            // Добыча исчезла (съели или ушла): подкармливаем и сбрасываем охоту
            self.feed_player_mass(ctx, me, mate, actions);
            self.reset_hunting_state(mate);
        }

        if let Some(enemy) = self.detect_player_target(ctx, me, mate) {
            self.set_hunt(Some(enemy.entity));
            actions.notify(mate.entity, ctx.me, NoticeKind::TargetingEnemyBot);
            crate::log(&format!("🎯 Bot {:?} targeting enemy bot cell {:?}", ctx.me, enemy.entity));
            self.execute_targeted_attack(ctx, me, enemy.entity, actions);
            return;
        }

        self.support_teammate(ctx, me, mate, actions);
    }

    fn set_hunt(&mut self, target: Option<Entity>) {
        if let TeamState::Teamed { hunt, .. } = &mut self.state {
            *hunt = target;
        }
    }

    fn set_assist(&mut self, mode: AssistMode) {
        if let TeamState::Teamed { assist, .. } = &mut self.state {
            *assist = mode;
        }
    }

    fn reset_hunting_state(&mut self, mate: &ParticipantSnapshot) {
        self.set_hunt(None);
        self.split_cooldown = 0;
        self.mouse = mate.center();
    }

    /// Тиммейт маленький → ведём его к ближайшему вирусу и пробиваем его
    fn virus_hunt_for_team(
        &mut self,
        ctx: &TickContext,
        me: &ParticipantSnapshot,
        mate: &ParticipantSnapshot,
        actions: &mut BotActions,
    ) -> bool {
        if mate.total_mass() >= ctx.tuning.virus_hunt_mass {
            return false;
        }
        let center = me.center();
        let candidates = ctx.view.iter().filter(|c| {
            c.kind == CellKind::Virus && center.distance(c.position) < ctx.tuning.virus_hunt_radius
        });
        let Some(virus) = nearest(candidates, center) else {
            return false;
        };

        self.mouse = virus.position;
        if center.distance(virus.position) < ctx.tuning.virus_contact_radius && self.virus_split_ready(ctx) {
            actions.split();
            self.last_virus_split_ms = Some(ctx.now_ms);
        }
        true
    }

    fn virus_split_ready(&self, ctx: &TickContext) -> bool {
        self.last_virus_split_ms
            .map_or(true, |at| ctx.now_ms.saturating_sub(at) > ctx.tuning.virus_split_cooldown_ms)
    }

    fn feed_interval_elapsed(&self, ctx: &TickContext) -> bool {
        self.last_feed_ms
            .map_or(true, |at| ctx.now_ms.saturating_sub(at) > ctx.config.bot_feed_interval_ms)
    }

    /// Целимся во вражескую cell, split если гарантированно достаём
    fn execute_targeted_attack(
        &mut self,
        ctx: &TickContext,
        me: &ParticipantSnapshot,
        target: Entity,
        actions: &mut BotActions,
    ) {
        let (Some(largest), Some(prey)) = (me.largest_cell(), ctx.arena.cell(target)) else {
            return;
        };
        let distance = largest.position.distance(prey.position).max(1.0);
        if self.split_cooldown == 0 && can_guarantee_split_kill(largest.size, prey, distance, ctx.config) {
            actions.split();
            self.split_cooldown = ctx.config.split_cooldown_ticks();
        }
        self.mouse = prey.position;
    }

    /// Ближайшая к прицелу тиммейта cell вражеского бота, которую мы перевешиваем
    fn detect_player_target<'a>(
        &self,
        ctx: &'a TickContext,
        me: &ParticipantSnapshot,
        mate: &ParticipantSnapshot,
    ) -> Option<&'a ViewNode> {
        let aim = mate.current_aim();
        let our_mass = me.total_mass();
        let candidates = ctx.view.iter().filter(|c| {
            c.kind == CellKind::PlayerCell
                && c.owner_is_bot
                && c.is_hostile_to(ctx.me, Some(mate.entity))
                && our_mass >= c.mass * ctx.tuning.outmass_ratio
                && c.position.distance(aim) < ctx.tuning.enemy_acquire_radius
        });
        nearest(candidates, aim)
    }

    fn support_teammate(
        &mut self,
        ctx: &TickContext,
        me: &ParticipantSnapshot,
        mate: &ParticipantSnapshot,
        actions: &mut BotActions,
    ) {
        self.maintain_combat_position(ctx, me, mate);

        if self.handle_viruses(ctx, me, mate, actions)
            || self.handle_combat_feeding(ctx, me, mate, actions)
            || self.handle_normal_feeding(ctx, me, mate, actions)
            || self.handle_bullet_collection(ctx, me, mate, actions)
        {
            return;
        }

        self.standard_behavior(ctx, me, actions);
        self.collect_player_fragments(ctx, mate);
        self.handle_split_running(ctx, me, mate, actions);
    }

    /// Escort: держимся позади тиммейта (против его прицела), в стороне от врагов
    fn maintain_combat_position(&mut self, ctx: &TickContext, me: &ParticipantSnapshot, mate: &ParticipantSnapshot) {
        let tuning = ctx.tuning;
        let center = me.center();
        let mate_center = mate.center();

        // Тиммейт стоит на месте: "вперёд" считаем в сторону бота
        let mut facing = mate.current_aim() - mate_center;
        if facing.length() < 0.1 {
            facing = center - mate_center;
        }
        let mut escort = mate_center - facing.normalize_or(Vec2::X) * tuning.base_follow_radius;

        let repulsion: Vec2 = ctx
            .view
            .iter()
            .filter(|c| {
                c.is_hostile_to(ctx.me, Some(mate.entity))
                    && c.position.distance(mate_center) < tuning.escort_enemy_radius
            })
            .map(|enemy| (escort - enemy.position).normalize_or_zero())
            .sum();
        escort += repulsion * tuning.escort_avoid_scale;

        if let Some(obstacle) = obstacle_in_path(ctx.view, ctx.me, Some(mate.entity), center, escort) {
            escort = (escort + avoidance_offset(center, obstacle.position, tuning.avoid_distance)) / 2.0;
        }

        self.mouse = self.mouse.lerp(escort, tuning.escort_smoothing);
    }

    /// Вирус, который безопасно пробить, иначе ближайший съедобный фрагмент
    fn handle_viruses(
        &mut self,
        ctx: &TickContext,
        me: &ParticipantSnapshot,
        mate: &ParticipantSnapshot,
        actions: &mut BotActions,
    ) -> bool {
        let tuning = ctx.tuning;
        let center = me.center();
        let total_mass = me.total_mass();

        if self.virus_split_ready(ctx) {
            let splittable = ctx.view.iter().find(|c| {
                c.kind == CellKind::Virus
                    && total_mass > c.mass * tuning.outmass_ratio
                    && center.distance(c.position) < tuning.virus_split_radius
            });
            if let Some(virus) = splittable {
                let rules = ctx.threat_rules();
                analyze_self_threats(
                    &mut self.threats,
                    &me.cells,
                    ctx.view,
                    ctx.me,
                    Some(mate.entity),
                    ctx.now_ms,
                    rules,
                );
                // Угроза, ушедшая из view, всё ещё блокирует split до конца окна
                if !self.threats.recently_threatened(ctx.now_ms, rules.response_window_ms) {
                    self.mouse = virus.position;
                    actions.split();
                    self.last_virus_split_ms = Some(ctx.now_ms);
                    return true;
                }
            }
        }

        let fragments = ctx.view.iter().filter(|c| {
            c.kind == CellKind::Food
                && center.distance(c.position) < tuning.fragment_radius
                && (c.mass < tuning.fragment_small_mass || total_mass > c.mass * tuning.fragment_mass_ratio)
        });
        let Some(fragment) = nearest(fragments, center) else {
            return false;
        };
        self.mouse = fragment.position;
        if center.distance(fragment.position) < tuning.pickup_radius {
            self.feed_player_mass(ctx, me, mate, actions);
        }
        true
    }

    /// Защитное кормление: угроза рядом или тиммейт близко
    fn handle_combat_feeding(
        &mut self,
        ctx: &TickContext,
        me: &ParticipantSnapshot,
        mate: &ParticipantSnapshot,
        actions: &mut BotActions,
    ) -> bool {
        let tuning = ctx.tuning;
        if self.combat_cooldown_until_ms > ctx.now_ms {
            return false;
        }

        let should_feed = analyze_self_threats(
            &mut self.threats,
            &me.cells,
            ctx.view,
            ctx.me,
            Some(mate.entity),
            ctx.now_ms,
            ctx.threat_rules(),
        )
        .is_some()
            || analyze_threats(ctx.view, ctx.me, mate, tuning.teammate_threat_radius)
            || is_player_chasing(ctx.view, ctx.me, mate, tuning.chase_radius)
            || me.center().distance(mate.center()) < tuning.combat_feed_radius;

        if !should_feed || me.total_mass() < mate.total_mass() * tuning.combat_mass_share {
            return false;
        }

        self.set_assist(AssistMode::Combat);
        if self.feed_interval_elapsed(ctx) {
            self.feed_player_mass(ctx, me, mate, actions);
            self.last_feed_ms = Some(ctx.now_ms);
            self.combat_cooldown_until_ms = ctx.now_ms + tuning.combat_feed_cooldown_ms;
        }
        true
    }

    /// Тиммейт слишком лёгкий: кормим с throttle
    fn handle_normal_feeding(
        &mut self,
        ctx: &TickContext,
        me: &ParticipantSnapshot,
        mate: &ParticipantSnapshot,
        actions: &mut BotActions,
    ) -> bool {
        let mate_mass = mate.total_mass();
        if mate_mass >= ctx.tuning.min_feed_mass && mate_mass >= me.total_mass() * ctx.tuning.feed_mass_share {
            return false;
        }

        self.set_assist(AssistMode::Feed);
        if self.feed_interval_elapsed(ctx) {
            self.feed_player_mass(ctx, me, mate, actions);
            self.last_feed_ms = Some(ctx.now_ms);
        }
        true
    }

    /// Подбираем чужие pellets и сразу передаём тиммейту
    fn handle_bullet_collection(
        &mut self,
        ctx: &TickContext,
        me: &ParticipantSnapshot,
        mate: &ParticipantSnapshot,
        actions: &mut BotActions,
    ) -> bool {
        let center = me.center();
        let pellets = ctx.view.iter().filter(|c| {
            c.kind == CellKind::EjectedMass
                && !c.is_owned_by(ctx.me)
                && center.distance(c.position) < ctx.tuning.bullet_radius
        });
        let Some(pellet) = nearest(pellets, center) else {
            return false;
        };
        self.mouse = pellet.position;
        if center.distance(pellet.position) < ctx.tuning.pickup_radius {
            self.feed_player_mass(ctx, me, mate, actions);
        }
        true
    }

    /// Мелкие осколки тиммейта рядом: собираем их
    fn collect_player_fragments(&mut self, ctx: &TickContext, mate: &ParticipantSnapshot) {
        let center = mate.center();
        let fragment = ctx.view.iter().find(|c| {
            c.is_owned_by(mate.entity)
                && c.mass < ctx.tuning.teammate_fragment_mass
                && c.position.distance(center) < ctx.tuning.teammate_fragment_radius
        });
        if let Some(fragment) = fragment {
            self.mouse = fragment.position;
        }
    }

    /// Тиммейт сделал split → делаем split в ту же сторону
    fn handle_split_running(
        &mut self,
        ctx: &TickContext,
        me: &ParticipantSnapshot,
        mate: &ParticipantSnapshot,
        actions: &mut BotActions,
    ) {
        let count = mate.cell_count();
        let grew = self.teammate_cells_seen.is_some_and(|seen| count > seen);
        self.teammate_cells_seen = Some(count);

        if !grew || self.split_run_cooldown > 0 || me.cell_count() >= ctx.tuning.split_run_max_cells {
            return;
        }

        let center = me.center();
        let direction = (mate.current_aim() - center).try_normalize().unwrap_or(Vec2::X);
        self.mouse = center + direction * ctx.tuning.split_run_distance;
        actions.split();
        self.split_run_cooldown = ctx.tuning.split_run_cooldown_ticks;
        crate::log(&format!("🏃 Bot {:?} split-running with {:?}", ctx.me, mate.entity));
    }

    /// Кормление: eject burst в самую большую cell тиммейта, препятствие обходим
    pub(crate) fn feed_player_mass(
        &mut self,
        ctx: &TickContext,
        me: &ParticipantSnapshot,
        mate: &ParticipantSnapshot,
        actions: &mut BotActions,
    ) {
        let target = mate.largest_cell().map_or(mate.center(), |c| c.position);
        let center = me.center();
        if let Some(obstacle) = obstacle_in_path(ctx.view, ctx.me, Some(mate.entity), center, target) {
            self.mouse = avoidance_offset(center, obstacle.position, ctx.tuning.avoid_distance);
            return;
        }
        self.mouse = target;
        actions.eject(ctx.tuning.eject_burst);
    }
}
