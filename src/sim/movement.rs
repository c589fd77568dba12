//! Unit movement: enterability, costs, and the move-or-attack verb
//!
//! A move request names only a destination; what actually happens there
//! (ordinary move, attack, city capture) is decided here, not by the
//! caller.

use crate::core::types::{CityId, PlayerId, UnitId};
use crate::sim::combat;
use crate::world::map::EXTRA_ROAD;
use crate::world::unit::MOVE_FRAGS;
use crate::world::GameWorld;

/// What a move request resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Attacked,
    CapturedCity,
    Blocked,
}

/// Whether any unit hostile to `player` sits on `tile`
pub fn enemy_units_on(world: &GameWorld, tile: usize, player: PlayerId) -> bool {
    world
        .map
        .tile(tile)
        .units
        .iter()
        .filter_map(|&id| world.unit(id))
        .any(|u| u.owner != player)
}

/// City on `tile` owned by someone other than `player`, if any
pub fn enemy_city_on(world: &GameWorld, tile: usize, player: PlayerId) -> Option<CityId> {
    let city_id = world.map.tile(tile).city?;
    let city = world.city(city_id)?;
    if city.owner != player {
        Some(city_id)
    } else {
        None
    }
}

/// Whether `tile` hosts something `player` could attack
pub fn attackable_tile(world: &GameWorld, tile: usize, player: PlayerId) -> bool {
    enemy_units_on(world, tile, player)
        || (enemy_city_on(world, tile, player).is_some()
            && !world.map.tile(tile).units.is_empty())
}

/// Whether the unit may enter `dst` by ordinary movement
///
/// An undefended enemy city counts as enterable: walking in captures it.
pub fn can_enter_tile(world: &GameWorld, unit_id: UnitId, dst: usize) -> bool {
    let Some(unit) = world.unit(unit_id) else {
        return false;
    };
    let tile = world.map.tile(dst);
    let terrain = &world.ruleset.terrain[tile.terrain];

    // No naval transport in the ruleset: land units stop at the shore
    if terrain.is_water {
        return false;
    }
    if enemy_units_on(world, dst, unit.owner) {
        return false;
    }
    true
}

/// Movement cost in fragments for stepping from `from` to `to`
pub fn move_cost(world: &GameWorld, from: usize, to: usize) -> u32 {
    let src = world.map.tile(from);
    let dst = world.map.tile(to);
    if src.has_extra(EXTRA_ROAD) && dst.has_extra(EXTRA_ROAD) {
        return 1;
    }
    world.ruleset.terrain[dst.terrain].move_cost * MOVE_FRAGS
}

/// Execute a move request against `dst`, deciding the verb there
pub fn move_or_attack(world: &mut GameWorld, unit_id: UnitId, dst: usize) -> MoveOutcome {
    let Some(unit) = world.unit(unit_id) else {
        return MoveOutcome::Blocked;
    };
    if unit.moves_left == 0 {
        return MoveOutcome::Blocked;
    }
    let owner = unit.owner;
    let attack = world.ruleset.unit_types[unit.type_idx].attack;
    let from = unit.tile;

    if enemy_units_on(world, dst, owner) {
        if attack == 0 {
            return MoveOutcome::Blocked;
        }
        combat::resolve_attack(world, unit_id, dst);
        return MoveOutcome::Attacked;
    }

    if !can_enter_tile(world, unit_id, dst) {
        return MoveOutcome::Blocked;
    }

    let cost = move_cost(world, from, dst);
    let captured = enemy_city_on(world, dst, owner);

    if let Some(unit) = world.unit_mut(unit_id) {
        unit.moves_left = unit.moves_left.saturating_sub(cost);
        unit.cancel_activity();
    }
    world.relocate_unit(unit_id, dst);

    if let Some(city_id) = captured {
        world.transfer_city(city_id, owner);
        return MoveOutcome::CapturedCity;
    }
    MoveOutcome::Moved
}
