//! CELLBOT AI Core
//!
//! Decision engine ботов для agar-подобной арены на Bevy 0.16 ECS.
//!
//! Хост (физика, коллизии, сеть) владеет cells и participants.
//! Бот каждый FixedUpdate тик читает снимок арены и отвечает:
//! - MouseIntent (куда двигаться)
//! - SplitRequested / EjectRequested (действия, как у человека)
//! - TeamNotice / RemoveRequested / RespawnRequested

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod ai;
pub mod components;
pub mod config;
pub mod geometry;
pub mod logger;
pub mod perception;
pub mod sandbox;

// Re-export базовых типов для удобства
pub use ai::{
    bot_bundle, BotBrain, BotPlugin, EjectRequested, NoticeKind, PelletEaten, RemoveRequested, RespawnRequested,
    SplitRequested, TeamNotice, TeamState,
};
pub use components::*;
pub use config::{ArenaClock, ArenaConfig, BotTuning};
pub use logger::{init_logger, log, log_info, log_warning, set_log_level, LogLevel};

/// Главный plugin (fixed timestep + RNG + боты)
pub struct CellbotPlugin;

impl Plugin for CellbotPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz (тик бота = тик физики хоста)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            // Детерминистичный RNG (seed по умолчанию)
            .insert_resource(DeterministicRng::new(42))
            .add_plugins(BotPlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции с ботами
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .add_plugins(CellbotPlugin)
        // Seed прогона поверх дефолтного RNG плагина
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot прицелов всех ботов для сравнения детерминизма
///
/// Entity index + mouse (bit-exact) + командное состояние, в порядке Entity index.
pub fn intent_snapshot(world: &mut World) -> Vec<u8> {
    let mut query = world.query::<(Entity, &BotBrain, &MouseIntent)>();
    let mut bots: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    bots.sort_by_key(|(entity, _, _)| entity.index());

    let mut snapshot = Vec::new();
    for (entity, brain, intent) in bots {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(&intent.0.x.to_bits().to_le_bytes());
        snapshot.extend_from_slice(&intent.0.y.to_bits().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", brain.state).as_bytes());
    }

    snapshot
}
