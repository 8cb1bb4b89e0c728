//! Headless демо арены CELLBOT
//!
//! Человек + два бота в seeded арене: человек "кормит" первого бота 10 pellets,
//! бот вступает в команду, дальше смотрим на решения и уведомления.

use bevy::prelude::*;
use cellbot_ai::sandbox::{scatter_food, spawn_player_cell, SandboxPlugin};
use cellbot_ai::{
    bot_bundle, create_headless_app, log_info, set_log_level, ArenaClock, BotBrain, CellColor, EjectRequested, MouseIntent,
    LogLevel, Participant, PelletEaten, SplitRequested, TeamNotice,
};

/// System: печать уведомлений ботов
fn print_notices(mut notices: EventReader<TeamNotice>, clock: Res<ArenaClock>) {
    for notice in notices.read() {
        log_info(&format!(
            "[{} ms] 💬 {:?} → {:?}: {}",
            clock.now_ms,
            notice.from,
            notice.to,
            notice.kind.message()
        ));
    }
}

fn main() {
    let seed = 42;
    println!("Starting CELLBOT headless arena (seed: {})", seed);

    let mut app = create_headless_app(seed);
    // В демо только Info и выше
    set_log_level(LogLevel::Info);
    app.add_plugins(SandboxPlugin)
        .add_systems(FixedUpdate, print_notices.after(cellbot_ai::ai::systems::bot_think));

    let world = app.world_mut();
    let human = world
        .spawn((Participant::human(1), CellColor::rgb(30, 160, 255), MouseIntent(Vec2::new(400.0, 0.0))))
        .id();
    let helper = world.spawn(bot_bundle(100, CellColor::rgb(200, 40, 40))).id();
    let rival = world.spawn(bot_bundle(101, CellColor::rgb(40, 200, 40))).id();

    spawn_player_cell(world, human, Vec2::new(0.0, 0.0), 400.0);
    spawn_player_cell(world, helper, Vec2::new(-300.0, 100.0), 300.0);
    spawn_player_cell(world, rival, Vec2::new(700.0, -200.0), 150.0);
    scatter_food(world, 200, 2000.0);

    // Человек кормит helper бота: 10 свежих pellets
    for _ in 0..10 {
        world.send_event(PelletEaten {
            eater: helper,
            feeder: human,
            ejected_at_ms: None,
        });
    }

    // Запускаем 600 тиков (10 секунд арены)
    for tick in 0..600 {
        app.world_mut().run_schedule(FixedUpdate);

        if tick % 100 == 0 {
            let world = app.world_mut();
            let splits = world.resource_mut::<Events<SplitRequested>>().drain().count();
            let ejects: u32 = world
                .resource_mut::<Events<EjectRequested>>()
                .drain()
                .map(|e| e.count)
                .sum();
            let state = world.get::<BotBrain>(helper).map(|b| b.state);
            println!(
                "Tick {}: helper {:?}, splits {}, ejects {}",
                tick, state, splits, ejects
            );
        }
    }

    println!("Simulation complete!");
}
