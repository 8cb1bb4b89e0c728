//! Sandbox host: минимальная арена для headless прогонов и интеграционных тестов
//!
//! Настоящий хост (сервер) владеет физикой и коллизиями. Здесь только:
//! - spawn helpers (cells, food, участники)
//! - движение cells к MouseIntent с постоянной скоростью
//! - обработка RemoveRequested (despawn участника и его cells)

use bevy::prelude::*;
use rand::Rng;

use crate::ai::events::RemoveRequested;
use crate::ai::systems::sync_bot_intents;
use crate::components::{ArenaPosition, Cell, CellKind, CellOwner, CellSpeed, MouseIntent, OwnedCells};
use crate::DeterministicRng;

/// Скорость cells без CellSpeed (единиц арены за тик)
pub const SANDBOX_CELL_SPEED: f32 = 10.0;

/// Sandbox host systems (после решений ботов, в том же FixedUpdate)
pub struct SandboxPlugin;

impl Plugin for SandboxPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (move_cells_toward_intent, despawn_removed_participants)
                .chain()
                .after(sync_bot_intents),
        );
    }
}

/// Cell участника + запись в его OwnedCells
pub fn spawn_player_cell(world: &mut World, owner: Entity, position: Vec2, mass: f32) -> Entity {
    let cell = world
        .spawn((
            Cell::from_mass(CellKind::PlayerCell, mass),
            ArenaPosition(position),
            CellOwner(owner),
        ))
        .id();
    if let Some(mut owned) = world.get_mut::<OwnedCells>(owner) {
        owned.0.push(cell);
    }
    if let Some(mut anchor) = world.get_mut::<ArenaPosition>(owner) {
        anchor.0 = position;
    }
    cell
}

/// Ничья cell (food, virus, pellet без владельца)
pub fn spawn_cell(world: &mut World, kind: CellKind, position: Vec2, mass: f32) -> Entity {
    world.spawn((Cell::from_mass(kind, mass), ArenaPosition(position))).id()
}

/// Рассыпать food в квадрате ±half_extent (детерминированно, через DeterministicRng)
pub fn scatter_food(world: &mut World, count: usize, half_extent: f32) -> Vec<Entity> {
    let positions: Vec<Vec2> = match world.get_resource_mut::<DeterministicRng>() {
        Some(mut rng) => (0..count)
            .map(|_| {
                Vec2::new(
                    rng.rng.gen_range(-half_extent..half_extent),
                    rng.rng.gen_range(-half_extent..half_extent),
                )
            })
            .collect(),
        None => {
            crate::log_warning("⚠️ scatter_food: DeterministicRng missing, no food spawned");
            Vec::new()
        }
    };

    positions
        .into_iter()
        .map(|position| spawn_cell(world, CellKind::Food, position, 1.0))
        .collect()
}

/// System: cells участника едут к его MouseIntent
pub fn move_cells_toward_intent(
    mut participants: Query<(&MouseIntent, &OwnedCells, &mut ArenaPosition), Without<Cell>>,
    mut cells: Query<(&mut ArenaPosition, Option<&CellSpeed>), With<Cell>>,
) {
    for (intent, owned, mut anchor) in participants.iter_mut() {
        let mut sum = Vec2::ZERO;
        let mut count = 0.0;
        for &cell in &owned.0 {
            let Ok((mut position, speed)) = cells.get_mut(cell) else {
                continue;
            };
            let step = speed.map(|s| s.0).unwrap_or(SANDBOX_CELL_SPEED);
            let delta = intent.0 - position.0;
            position.0 += delta.clamp_length_max(step);
            sum += position.0;
            count += 1.0;
        }
        if count > 0.0 {
            anchor.0 = sum / count;
        }
    }
}

/// System: RemoveRequested → despawn участника вместе с cells
pub fn despawn_removed_participants(
    mut removals: EventReader<RemoveRequested>,
    owned: Query<&OwnedCells>,
    live_cells: Query<(), With<Cell>>,
    mut commands: Commands,
) {
    for removal in removals.read() {
        let Ok(cells) = owned.get(removal.participant) else {
            continue;
        };
        for &cell in cells.0.iter().filter(|&&cell| live_cells.contains(cell)) {
            commands.entity(cell).despawn();
        }
        commands.entity(removal.participant).despawn();
        crate::log_info(&format!("👋 Participant {:?} removed from arena", removal.participant));
    }
}
