//! Конфигурация: глобальные константы арены + тюнинг бота
//!
//! - ArenaConfig (Resource): физические константы, которые задаёт сервер
//! - BotTuning (Component): пороги поведения конкретного бота
//! - ArenaClock (Resource): игровое время в ms (cooldowns сравниваются с ним)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Глобальные константы арены (читаются ботом, не изменяются им)
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Максимум cells на одного участника
    pub player_max_cells: usize,
    /// Merge delay (секунды). `<= 0`: merge-delay выключен
    pub player_merge_time: f32,
    /// Скорость split-снаряда
    pub player_split_speed: f32,
    /// Скорость выстрела вирусом
    pub virus_shot_speed: f32,
    /// Минимальный интервал между кормлениями тиммейта (ms)
    pub bot_feed_interval_ms: u64,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            player_max_cells: 16,
            player_merge_time: 30.0,
            player_split_speed: 780.0,
            virus_shot_speed: 780.0,
            bot_feed_interval_ms: 100,
        }
    }
}

impl ArenaConfig {
    /// true когда cells сливаются мгновенно (агрессивные split-kill)
    pub fn merge_disabled(&self) -> bool {
        self.player_merge_time <= 0.0
    }

    /// Pursuit window после split-kill (тики)
    pub fn pursuit_ticks(&self) -> u32 {
        if self.merge_disabled() { 5 } else { 20 }
    }

    /// Split cooldown после split-атаки (тики)
    pub fn split_cooldown_ticks(&self) -> u32 {
        if self.merge_disabled() { 5 } else { 15 }
    }
}

/// Игровые часы арены
///
/// Продвигаются на `Time<Fixed>::timestep()` каждый FixedUpdate тик.
/// Все timestamp'ы бота (threat memory, feed throttle, virus split): в ms этих часов.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ArenaClock {
    pub now_ms: u64,
    pub tick: u64,
    elapsed_us: u64,
}

impl ArenaClock {
    pub fn at(now_ms: u64) -> Self {
        Self {
            now_ms,
            tick: 0,
            elapsed_us: now_ms * 1000,
        }
    }

    pub fn advance(&mut self, step_us: u64) {
        self.tick += 1;
        self.elapsed_us += step_us;
        self.now_ms = self.elapsed_us / 1000;
    }
}

/// Пороги поведения бота
///
/// Дистанции: в единицах арены, времена: в ms, *_ticks: в FixedUpdate тиках.
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct BotTuning {
    /// Дальше этого от тиммейта: бросаем всё и догоняем
    pub follow_priority_radius: f32,
    /// Escort: дистанция позади тиммейта
    pub base_follow_radius: f32,
    /// Escort: враги ближе этого к тиммейту отталкивают escort-точку
    pub escort_enemy_radius: f32,
    pub escort_avoid_scale: f32,
    /// Escort: доля шага к новой точке за тик (сглаживание)
    pub escort_smoothing: f32,
    /// Обход препятствия: перпендикулярный сдвиг
    pub avoid_distance: f32,
    /// Вес притяжения к тиммейту в potential field
    pub team_pull_weight: f32,

    /// Pellet считается свежим, если съеден раньше чем через N ms
    pub bullet_freshness_ms: u64,
    /// Сколько свежих кормлений нужно для bond
    pub feeds_to_bond: u32,

    /// Окно памяти угроз (ms)
    pub threat_response_ms: u64,
    pub threat_mass_ratio: f32,
    pub threat_size_factor: f32,
    pub teammate_threat_radius: f32,
    pub chase_radius: f32,

    /// Virus hunt включается когда масса тиммейта ниже
    pub virus_hunt_mass: f32,
    pub virus_hunt_radius: f32,
    pub virus_contact_radius: f32,
    pub virus_split_cooldown_ms: u64,
    pub virus_feed_radius: f32,
    pub virus_split_radius: f32,

    pub fragment_radius: f32,
    pub fragment_small_mass: f32,
    pub fragment_mass_ratio: f32,

    pub combat_feed_radius: f32,
    /// Бот кормит в бою только если его масса ≥ доли массы тиммейта
    pub combat_mass_share: f32,
    pub combat_feed_cooldown_ms: u64,

    pub min_feed_mass: f32,
    pub feed_mass_share: f32,
    /// Сколько eject за одно кормление
    pub eject_burst: u32,

    pub bullet_radius: f32,
    pub pickup_radius: f32,

    pub enemy_acquire_radius: f32,
    /// Во сколько раз бот должен быть тяжелее enemy bot / вируса, чтобы атаковать
    pub outmass_ratio: f32,

    pub split_run_max_cells: usize,
    pub split_run_distance: f32,
    pub split_run_cooldown_ticks: u32,

    pub teammate_fragment_mass: f32,
    pub teammate_fragment_radius: f32,

    /// Скорость cell, если хост её не сообщает
    pub default_cell_speed: f32,
    /// Максимальный lookahead предсказания позиции тиммейта
    pub lookahead_cap: f32,
}

impl Default for BotTuning {
    fn default() -> Self {
        Self {
            follow_priority_radius: 900.0,
            base_follow_radius: 250.0,
            escort_enemy_radius: 300.0,
            escort_avoid_scale: 50.0,
            escort_smoothing: 0.2,
            avoid_distance: 150.0,
            team_pull_weight: 0.8,

            bullet_freshness_ms: 2000,
            feeds_to_bond: 10,

            threat_response_ms: 1500,
            threat_mass_ratio: 1.15,
            threat_size_factor: 3.0,
            teammate_threat_radius: 500.0,
            chase_radius: 250.0,

            virus_hunt_mass: 3000.0,
            virus_hunt_radius: 400.0,
            virus_contact_radius: 50.0,
            virus_split_cooldown_ms: 1500,
            virus_feed_radius: 100.0,
            virus_split_radius: 250.0,

            fragment_radius: 400.0,
            fragment_small_mass: 30.0,
            fragment_mass_ratio: 1.2,

            combat_feed_radius: 400.0,
            combat_mass_share: 0.3,
            combat_feed_cooldown_ms: 50,

            min_feed_mass: 300.0,
            feed_mass_share: 0.8,
            eject_burst: 6,

            bullet_radius: 800.0,
            pickup_radius: 50.0,

            enemy_acquire_radius: 250.0,
            outmass_ratio: 1.3,

            split_run_max_cells: 16,
            split_run_distance: 1000.0,
            split_run_cooldown_ticks: 800,

            teammate_fragment_mass: 25.0,
            teammate_fragment_radius: 600.0,

            default_cell_speed: 10.0,
            lookahead_cap: 1.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_disabled_windows() {
        let mut config = ArenaConfig::default();
        assert!(!config.merge_disabled());
        assert_eq!(config.pursuit_ticks(), 20);
        assert_eq!(config.split_cooldown_ticks(), 15);

        config.player_merge_time = 0.0;
        assert!(config.merge_disabled());
        assert_eq!(config.pursuit_ticks(), 5);
        assert_eq!(config.split_cooldown_ticks(), 5);
    }

    #[test]
    fn test_clock_accumulates_sub_millisecond_steps() {
        let mut clock = ArenaClock::default();
        for _ in 0..60 {
            clock.advance(16_667); // 60Hz
        }
        assert_eq!(clock.tick, 60);
        assert_eq!(clock.now_ms, 1000);
    }

    #[test]
    fn test_bot_tuning_defaults() {
        let tuning = BotTuning::default();
        assert_eq!(tuning.feeds_to_bond, 10);
        assert_eq!(tuning.bullet_freshness_ms, 2000);
        assert_eq!(tuning.follow_priority_radius, 900.0);
        assert_eq!(tuning.eject_burst, 6);
    }
}
