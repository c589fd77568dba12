//! Attack resolution
//!
//! Combat is a round loop: each round one side loses hit points, chosen
//! by a strength-weighted roll from the world RNG. The defender is the
//! strongest defender on the target tile. The loser is removed from the
//! arena; the winner may be promoted.

use rand::Rng;

use crate::core::types::UnitId;
use crate::world::unit::{Unit, MOVE_FRAGS};
use crate::world::GameWorld;

/// Hit points lost by the losing side of one combat round
const ROUND_DAMAGE: u32 = 2;

/// Strength multiplier per veteran level
const VETERAN_BONUS: f64 = 0.25;

/// Defense multiplier for fortified units
const FORTIFY_BONUS: f64 = 1.5;

/// Chance the winner is promoted one veteran level
const PROMOTION_CHANCE: f64 = 1.0 / 3.0;

fn attack_power(world: &GameWorld, unit: &Unit) -> f64 {
    let def = &world.ruleset.unit_types[unit.type_idx];
    let base = f64::from(def.attack);
    let veteran = 1.0 + VETERAN_BONUS * f64::from(unit.veteran);
    let health = f64::from(unit.hp) / f64::from(unit.max_hp);
    base * veteran * health
}

fn defense_power(world: &GameWorld, unit: &Unit) -> f64 {
    let def = &world.ruleset.unit_types[unit.type_idx];
    let tile = world.map.tile(unit.tile);
    let terrain = f64::from(world.ruleset.terrain[tile.terrain].defense_bonus) / 100.0;

    let mut power = f64::from(def.defense) * terrain;
    if unit.is_fortified() {
        power *= FORTIFY_BONUS;
    }
    // City Walls double the defense of the garrison
    if let Some(city_id) = tile.city {
        if let (Some(city), Some(walls)) = (
            world.city(city_id),
            world.ruleset.building_by_name("City Walls"),
        ) {
            if city.built.contains(&walls) {
                power *= 2.0;
            }
        }
    }
    power *= 1.0 + VETERAN_BONUS * f64::from(unit.veteran);
    power * f64::from(unit.hp) / f64::from(unit.max_hp)
}

/// Strongest defender on `tile`, by current defense power
pub fn best_defender(world: &GameWorld, tile: usize) -> Option<UnitId> {
    world
        .map
        .tile(tile)
        .units
        .iter()
        .filter_map(|&id| world.unit(id).map(|u| (id, defense_power(world, u))))
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(id, _)| id)
}

/// Fight it out; returns true if the attacker survived
///
/// The attacker spends a full movement point whatever the outcome.
pub fn resolve_attack(world: &mut GameWorld, attacker_id: UnitId, target_tile: usize) -> bool {
    let Some(defender_id) = best_defender(world, target_tile) else {
        return false;
    };

    let att = {
        let Some(attacker) = world.unit(attacker_id) else {
            return false;
        };
        attack_power(world, attacker)
    };
    let def = {
        let defender = world.unit(defender_id).expect("defender resolved above");
        defense_power(world, defender)
    };

    // Degenerate matchup: a zero-strength attacker always loses
    let total = att + def;
    if total <= 0.0 || att <= 0.0 {
        world.remove_unit(attacker_id);
        return false;
    }

    loop {
        let roll: f64 = world.rng.gen_range(0.0..total);
        let (loser, winner) = if roll < att {
            (defender_id, attacker_id)
        } else {
            (attacker_id, defender_id)
        };

        let dead = {
            let unit = world.unit_mut(loser).expect("combatant in arena");
            unit.hp = unit.hp.saturating_sub(ROUND_DAMAGE);
            unit.hp == 0
        };

        if dead {
            world.remove_unit(loser);
            let promote = world.rng.gen_bool(PROMOTION_CHANCE);
            if let Some(unit) = world.unit_mut(winner) {
                if promote {
                    unit.veteran += 1;
                }
            }
            if let Some(attacker) = world.unit_mut(attacker_id) {
                attacker.moves_left = attacker.moves_left.saturating_sub(MOVE_FRAGS);
            }
            return loser == defender_id;
        }
    }
}
