//! Bot Brain: состояние бота и главный цикл решения на тик
//!
//! Порядок тика:
//! 1. cooldowns (split, split-run)
//! 2. demotion: тиммейт пропал или без cells → Solo
//! 3. recovery: Solo + запомненный stable id найден с cells и не занят другим ботом → снова Teamed
//! 4. team cycle (тиммейт подключён) или potential-field planner; без своих cells пропускается
//! 5. lifecycle: close requested → remove, без cells → respawn
//!
//! Brain не трогает ECS: на вход TickContext (снимок арены), на выход BotActions.
//! Системы в `ai::systems` переводят BotActions в события.

use bevy::prelude::*;

use super::events::{NoticeKind, TeamNotice};
use super::team::TeamRoster;
use super::threat::{SelfThreatRules, ThreatMemory};
use crate::components::CellColor;
use crate::config::{ArenaConfig, BotTuning};
use crate::perception::{ArenaSnapshot, ParticipantSnapshot, ParticipantView, ViewNode};

/// Что бот делает для тиммейта (информативно, влияет только на логи)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssistMode {
    Feed,
    #[default]
    Combat,
}

/// Командное состояние бота
///
/// Solo ↔ Teamed. Hunt (атака вражеского бота) живёт только внутри Teamed,
/// поэтому demotion автоматически сбрасывает охоту.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TeamState {
    #[default]
    Solo,
    Teamed {
        teammate: Entity,
        assist: AssistMode,
        /// Вражеская cell, которую атакуем
        hunt: Option<Entity>,
    },
}

impl TeamState {
    pub fn teamed_with(teammate: Entity) -> Self {
        TeamState::Teamed {
            teammate,
            assist: AssistMode::Combat,
            hunt: None,
        }
    }

    pub fn teammate(&self) -> Option<Entity> {
        match self {
            TeamState::Teamed { teammate, .. } => Some(*teammate),
            TeamState::Solo => None,
        }
    }

    pub fn hunt(&self) -> Option<Entity> {
        match self {
            TeamState::Teamed { hunt, .. } => *hunt,
            TeamState::Solo => None,
        }
    }

    pub fn assist(&self) -> Option<AssistMode> {
        match self {
            TeamState::Teamed { assist, .. } => Some(*assist),
            TeamState::Solo => None,
        }
    }

    pub fn is_teamed(&self) -> bool {
        matches!(self, TeamState::Teamed { .. })
    }
}

/// Окно преследования после split-атаки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pursuit {
    pub target: Entity,
    pub ticks_left: u32,
}

/// Результат тика: действия участника + side effects для хоста
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BotActions {
    pub splits: u32,
    pub ejects: u32,
    pub notices: Vec<TeamNotice>,
    /// Новый цвет cells бота
    pub recolor: Option<CellColor>,
    pub remove_self: bool,
    pub respawn: bool,
}

impl BotActions {
    pub fn split(&mut self) {
        self.splits += 1;
    }

    pub fn eject(&mut self, count: u32) {
        self.ejects += count;
    }

    pub fn notify(&mut self, to: Entity, from: Entity, kind: NoticeKind) {
        self.notices.push(TeamNotice { to, from, kind });
    }

    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Всё, что бот видит за один тик
pub struct TickContext<'a> {
    pub me: Entity,
    pub now_ms: u64,
    pub arena: &'a ArenaSnapshot,
    /// Cells в ViewBox бота
    pub view: &'a [ViewNode],
    pub config: &'a ArenaConfig,
    pub tuning: &'a BotTuning,
    /// Текущие bonds всех ботов (для recovery)
    pub roster: &'a TeamRoster,
}

impl TickContext<'_> {
    pub fn threat_rules(&self) -> SelfThreatRules {
        SelfThreatRules {
            response_window_ms: self.tuning.threat_response_ms,
            mass_ratio: self.tuning.threat_mass_ratio,
            size_factor: self.tuning.threat_size_factor,
        }
    }
}

/// Мозг бота (ECS Component на participant entity бота)
///
/// Хранит только entity ids между тиками; каждая ссылка перепроверяется
/// по снимку арены перед использованием.
#[derive(Component, Debug, Clone)]
pub struct BotBrain {
    /// Точка прицела, выставляется каждый тик
    pub mouse: Vec2,
    /// mouse уже стартовал с центра бота
    pub mouse_seeded: bool,
    pub state: TeamState,
    /// Stable id последнего тиммейта (переживает demotion)
    pub teammate_id: Option<u64>,
    /// Цвет до присоединения к команде
    pub original_color: CellColor,

    /// Тики до следующего split-kill
    pub split_cooldown: u32,
    /// Тики до следующего split-run
    pub split_run_cooldown: u32,
    pub last_virus_split_ms: Option<u64>,
    /// Combat feeding заблокирован до этого момента
    pub combat_cooldown_until_ms: u64,
    pub last_feed_ms: Option<u64>,

    /// Свежие pellets от кандидата в тиммейты
    pub bullets_fed: u32,
    pub last_bullet_ms: Option<u64>,

    pub threats: ThreatMemory,
    pub pursuit: Option<Pursuit>,
    /// Число cells тиммейта на прошлом split-run наблюдении
    pub teammate_cells_seen: Option<usize>,
}

impl BotBrain {
    pub fn new(original_color: CellColor) -> Self {
        Self {
            mouse: Vec2::ZERO,
            mouse_seeded: false,
            state: TeamState::Solo,
            teammate_id: None,
            original_color,
            split_cooldown: 0,
            split_run_cooldown: 0,
            last_virus_split_ms: None,
            combat_cooldown_until_ms: 0,
            last_feed_ms: None,
            bullets_fed: 0,
            last_bullet_ms: None,
            threats: ThreatMemory::default(),
            pursuit: None,
            teammate_cells_seen: None,
        }
    }

    pub fn teammate(&self) -> Option<Entity> {
        self.state.teammate()
    }

    /// Один тик решения
    pub fn tick(&mut self, ctx: &TickContext) -> BotActions {
        let mut actions = BotActions::default();
        let Some(me) = ctx.arena.participant(ctx.me) else {
            crate::log_warning(&format!("⚠️ Bot {:?} missing from arena snapshot, skipping tick", ctx.me));
            return actions;
        };

        self.tick_cooldowns();
        self.demote_if_teammate_lost(ctx, &mut actions);
        self.try_recover_teammate(ctx, &mut actions);

        // Без cells бот ничего не делает, только просит respawn
        if me.cell_count() > 0 {
            if !self.mouse_seeded {
                self.mouse = me.center();
                self.mouse_seeded = true;
            }
            let teammate = self.teammate().and_then(|t| ctx.arena.participant(t));
            match teammate {
                Some(mate) if mate.connected => self.team_behavior_cycle(ctx, me, mate, &mut actions),
                _ => self.standard_behavior(ctx, me, &mut actions),
            }
        }

        self.check_connection(me, &mut actions);
        actions
    }

    fn tick_cooldowns(&mut self) {
        self.split_cooldown = self.split_cooldown.saturating_sub(1);
        self.split_run_cooldown = self.split_run_cooldown.saturating_sub(1);
    }

    /// Тиммейт исчез или потерял все cells → Solo (stable id остаётся для recovery)
    fn demote_if_teammate_lost(&mut self, ctx: &TickContext, actions: &mut BotActions) {
        let Some(teammate) = self.teammate() else {
            return;
        };
        let alive = ctx
            .arena
            .participant(teammate)
            .map(|p| p.cell_count() > 0)
            .unwrap_or(false);
        if alive {
            return;
        }

        self.state = TeamState::Solo;
        self.bullets_fed = 0;
        actions.recolor = Some(self.original_color);
        crate::log(&format!("💔 Bot {:?} lost teammate {:?}, back to solo", ctx.me, teammate));
    }

    /// Solo + известный stable id → ищем тиммейта в roster
    fn try_recover_teammate(&mut self, ctx: &TickContext, actions: &mut BotActions) {
        if self.state.is_teamed() {
            return;
        }
        let Some(stable_id) = self.teammate_id else {
            return;
        };
        let Some(candidate) = ctx.arena.participant_by_stable_id(stable_id) else {
            return;
        };
        if candidate.entity == ctx.me || candidate.cell_count() == 0 {
            return;
        }
        if ctx.roster.is_claimed_by_other(candidate.entity, ctx.me) {
            return;
        }

        self.state = TeamState::teamed_with(candidate.entity);
        self.mouse = candidate.center();
        actions.recolor = Some(candidate.color);
        actions.notify(candidate.entity, ctx.me, NoticeKind::Rejoined);
        crate::log_info(&format!(
            "🤝 Bot {:?} rejoined teammate {:?} (stable id {})",
            ctx.me, candidate.entity, stable_id
        ));
    }

    /// Planner по самой большой своей cell (ничего, если cells нет)
    pub(crate) fn standard_behavior(&mut self, ctx: &TickContext, me: &ParticipantSnapshot, actions: &mut BotActions) {
        if let Some(cell) = me.largest_cell() {
            self.decide_behavior(ctx, me, cell, actions);
        }
    }

    fn check_connection(&self, me: &ParticipantSnapshot, actions: &mut BotActions) {
        if me.close_requested {
            actions.remove_self = true;
        } else if me.cell_count() == 0 {
            actions.respawn = true;
        }
    }
}
