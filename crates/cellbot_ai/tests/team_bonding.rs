//! Team bonding integration test
//!
//! Headless app + BotPlugin, тики через run_schedule(FixedUpdate).
//!
//! Проверяем:
//! - 10 свежих pellets → bond, уведомление, цвет тиммейта
//! - два бота не делят одного участника
//! - кормление маленького тиммейта → EjectRequested
//! - потеря тиммейта → Solo + исходный цвет
//! - lifecycle события (respawn / remove)

use bevy::prelude::*;
use cellbot_ai::sandbox::{spawn_player_cell, SandboxPlugin};
use cellbot_ai::*;

const HUMAN_COLOR: CellColor = CellColor::rgb(30, 160, 255);
const BOT_COLOR: CellColor = CellColor::rgb(200, 40, 40);

fn tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}

fn drain<E: Event>(app: &mut App) -> Vec<E> {
    app.world_mut().resource_mut::<Events<E>>().drain().collect()
}

fn spawn_human(app: &mut App, stable_id: u64, position: Vec2, mass: f32) -> Entity {
    let world = app.world_mut();
    let human = world
        .spawn((Participant::human(stable_id), HUMAN_COLOR, MouseIntent(position)))
        .id();
    spawn_player_cell(world, human, position, mass);
    human
}

fn spawn_bot(app: &mut App, stable_id: u64, position: Vec2, mass: f32) -> Entity {
    let world = app.world_mut();
    let bot = world.spawn(bot_bundle(stable_id, BOT_COLOR)).id();
    spawn_player_cell(world, bot, position, mass);
    bot
}

fn feed(app: &mut App, bot: Entity, human: Entity, pellets: usize) {
    for _ in 0..pellets {
        app.world_mut().send_event(PelletEaten {
            eater: bot,
            feeder: human,
            ejected_at_ms: None,
        });
    }
}

fn teammate_of(app: &App, bot: Entity) -> Option<Entity> {
    app.world().get::<BotBrain>(bot).and_then(|b| b.teammate())
}

#[test]
fn test_ten_pellets_bond_bot_to_feeder() {
    let mut app = create_headless_app(1);
    let human = spawn_human(&mut app, 1, Vec2::ZERO, 500.0);
    let bot = spawn_bot(&mut app, 100, Vec2::new(300.0, 0.0), 200.0);

    feed(&mut app, bot, human, 9);
    tick(&mut app);
    assert_eq!(teammate_of(&app, bot), None);

    feed(&mut app, bot, human, 1);
    tick(&mut app);
    assert_eq!(teammate_of(&app, bot), Some(human));
    assert_eq!(app.world().get::<CellColor>(bot), Some(&HUMAN_COLOR));

    let notices = drain::<TeamNotice>(&mut app);
    assert!(notices
        .iter()
        .any(|n| n.kind == NoticeKind::Joined && n.to == human && n.from == bot));
}

#[test]
fn test_two_bots_feeding_same_human_only_one_bonds() {
    let mut app = create_headless_app(2);
    let human = spawn_human(&mut app, 1, Vec2::ZERO, 500.0);
    let bot_a = spawn_bot(&mut app, 100, Vec2::new(300.0, 0.0), 200.0);
    let bot_b = spawn_bot(&mut app, 101, Vec2::new(-300.0, 0.0), 200.0);

    for _ in 0..10 {
        feed(&mut app, bot_a, human, 1);
        feed(&mut app, bot_b, human, 1);
    }
    tick(&mut app);

    let bonded = [bot_a, bot_b]
        .iter()
        .filter(|&&bot| teammate_of(&app, bot) == Some(human))
        .count();
    assert_eq!(bonded, 1);
}

#[test]
fn test_bonded_bot_feeds_small_teammate() {
    let mut app = create_headless_app(3);
    let human = spawn_human(&mut app, 1, Vec2::new(500.0, 0.0), 50.0);
    let bot = spawn_bot(&mut app, 100, Vec2::ZERO, 100.0);

    feed(&mut app, bot, human, 10);
    tick(&mut app);

    let ejects = drain::<EjectRequested>(&mut app);
    assert_eq!(ejects.len(), 1);
    assert_eq!(ejects[0].participant, bot);
    assert_eq!(ejects[0].count, 6);

    // Прицел бота синхронизирован в MouseIntent
    let brain_mouse = app.world().get::<BotBrain>(bot).map(|b| b.mouse);
    let intent = app.world().get::<MouseIntent>(bot).map(|m| m.0);
    assert_eq!(brain_mouse, intent);
    assert_eq!(intent, Some(Vec2::new(500.0, 0.0)));
}

#[test]
fn test_teammate_death_demotes_and_restores_color() {
    let mut app = create_headless_app(4);
    let human = spawn_human(&mut app, 1, Vec2::ZERO, 500.0);
    let bot = spawn_bot(&mut app, 100, Vec2::new(300.0, 0.0), 200.0);

    feed(&mut app, bot, human, 10);
    tick(&mut app);
    assert_eq!(teammate_of(&app, bot), Some(human));

    // Хост съел все cells тиммейта
    let cells: Vec<Entity> = app
        .world()
        .get::<OwnedCells>(human)
        .map(|owned| owned.0.clone())
        .unwrap_or_default();
    for cell in cells {
        app.world_mut().despawn(cell);
    }
    if let Some(mut owned) = app.world_mut().get_mut::<OwnedCells>(human) {
        owned.0.clear();
    }

    tick(&mut app);
    let brain = app.world().get::<BotBrain>(bot).expect("bot brain");
    assert_eq!(brain.state, TeamState::Solo);
    assert_eq!(brain.teammate_id, Some(1));
    assert_eq!(brain.bullets_fed, 0);
    assert_eq!(app.world().get::<CellColor>(bot), Some(&BOT_COLOR));

    // Респавн тиммейта: бот находит его по stable id
    spawn_player_cell(app.world_mut(), human, Vec2::new(100.0, 0.0), 300.0);
    tick(&mut app);
    assert_eq!(teammate_of(&app, bot), Some(human));
    let notices = drain::<TeamNotice>(&mut app);
    assert!(notices.iter().any(|n| n.kind == NoticeKind::Rejoined));
}

#[test]
fn test_lifecycle_events() {
    let mut app = create_headless_app(5);
    app.add_plugins(SandboxPlugin);
    let empty_bot = app.world_mut().spawn(bot_bundle(100, BOT_COLOR)).id();
    let leaving_bot = spawn_bot(&mut app, 101, Vec2::ZERO, 100.0);
    if let Some(mut connection) = app.world_mut().get_mut::<Connection>(leaving_bot) {
        connection.close_requested = true;
    }

    tick(&mut app);

    let respawns = drain::<RespawnRequested>(&mut app);
    assert_eq!(respawns, vec![RespawnRequested { participant: empty_bot }]);
    let removals = drain::<RemoveRequested>(&mut app);
    assert_eq!(removals, vec![RemoveRequested { participant: leaving_bot }]);

    // Sandbox host убрал бота вместе с cells
    assert!(!app.world().entities().contains(leaving_bot));
}
