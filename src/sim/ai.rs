//! AI phase hook
//!
//! One call runs a full phase for one AI player: units act, cities pick
//! production, research gets a target. The policy is heuristic and
//! skill-scaled; all randomness comes from the world RNG so games replay
//! identically from the same seed.

use rand::Rng;

use crate::core::types::{Direction, PlayerId, UnitId};
use crate::sim::commands::{self, TerrainActivity};
use crate::sim::movement::{self, MoveOutcome};
use crate::world::city::ProductionTarget;
use crate::world::GameWorld;

/// Run one full phase for an AI player
pub fn run_phase(world: &mut GameWorld, player: PlayerId) {
    let skill = world.players[player.index()].skill;

    let unit_ids: Vec<UnitId> = world.players[player.index()].units.clone();
    for unit_id in unit_ids {
        run_unit(world, player, unit_id, skill);
    }

    let city_ids: Vec<_> = world.players[player.index()].cities.clone();
    for city_id in city_ids {
        if world.city(city_id).map(|c| c.production.is_none()) == Some(true) {
            pick_production(world, player, city_id);
        }
    }

    pick_research(world, player);

    world.players[player.index()].phase_done = true;
}

fn run_unit(world: &mut GameWorld, player: PlayerId, unit_id: UnitId, skill: u32) {
    let Some(unit) = world.unit(unit_id) else {
        return; // died earlier this phase
    };
    let def = &world.ruleset.unit_types[unit.type_idx];
    let can_found = def.can_found_city;
    let can_improve = def.can_improve_terrain;
    let attack = def.attack;

    if can_found && commands::can_found_city(world, unit_id) {
        commands::found_city(world, unit_id);
        return;
    }

    // Aggressive play unlocks with skill
    if attack > 0 && skill >= 2 {
        if let Some(target) = adjacent_enemy_tile(world, unit_id, player) {
            movement::move_or_attack(world, unit_id, target);
            return;
        }
    }

    // Workers improve the tile they stand on once the empire settles down
    if can_improve && skill >= 4 && world.rng.gen_bool(0.5) {
        for activity in [
            TerrainActivity::Irrigation,
            TerrainActivity::Mine,
            TerrainActivity::Road,
        ] {
            if commands::start_activity(world, unit_id, activity) {
                return;
            }
        }
    }

    wander(world, unit_id);
}

/// Adjacent tile holding something attackable, if any
fn adjacent_enemy_tile(world: &GameWorld, unit_id: UnitId, player: PlayerId) -> Option<usize> {
    let unit = world.unit(unit_id)?;
    Direction::ALL
        .iter()
        .filter_map(|&dir| world.map.step(unit.tile, dir))
        .find(|&tile| movement::attackable_tile(world, tile, player))
}

/// Take random enterable steps until movement runs out
fn wander(world: &mut GameWorld, unit_id: UnitId) {
    for _ in 0..8 {
        let Some(unit) = world.unit(unit_id) else {
            return;
        };
        if unit.moves_left == 0 {
            return;
        }
        let from = unit.tile;

        let options: Vec<usize> = Direction::ALL
            .iter()
            .filter_map(|&dir| world.map.step(from, dir))
            .filter(|&dst| movement::can_enter_tile(world, unit_id, dst))
            .collect();
        if options.is_empty() {
            return;
        }
        let dst = options[world.rng.gen_range(0..options.len())];
        if movement::move_or_attack(world, unit_id, dst) != MoveOutcome::Moved {
            return;
        }
    }
}

/// Choose production for an idle city: units while the army is thin,
/// then the cheapest missing building
fn pick_production(world: &mut GameWorld, player: PlayerId, city_id: crate::core::types::CityId) {
    let (num_units, num_cities) = {
        let p = &world.players[player.index()];
        (p.units.len(), p.cities.len())
    };
    let Some(city) = world.city(city_id) else {
        return;
    };

    let target = if num_units < num_cities * 2 + 2 {
        let cheapest_unit = world
            .ruleset
            .unit_types
            .iter()
            .enumerate()
            .filter(|(idx, _)| commands::can_build_unit_now(world, city, *idx))
            .min_by_key(|(_, def)| def.cost)
            .map(|(idx, _)| ProductionTarget::Unit(idx));
        cheapest_unit
    } else {
        world
            .ruleset
            .buildings
            .iter()
            .enumerate()
            .filter(|(idx, _)| commands::can_build_building_now(world, city, *idx))
            .min_by_key(|(_, def)| def.cost)
            .map(|(idx, _)| ProductionTarget::Building(idx))
    };

    if let Some(target) = target {
        commands::set_production(world, city_id, target);
    }
}

/// Pick the first researchable tech if none is targeted
fn pick_research(world: &mut GameWorld, player: PlayerId) {
    if world.players[player.index()].research.current.is_some() {
        return;
    }
    let choice = (0..world.ruleset.num_techs()).find(|&idx| {
        world.players[player.index()]
            .research
            .can_research(&world.ruleset, idx)
    });
    if let Some(tech) = choice {
        commands::set_research(world, player, tech);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Ruleset;
    use crate::world::map::Map;
    use crate::world::player::Player;
    use crate::world::visibility::PlayerVision;
    use crate::world::Settings;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn world_with_ai() -> GameWorld {
        let ruleset = Ruleset::load("classic").unwrap();
        let grass = ruleset.terrain_by_name("Grassland").unwrap();
        let map = Map::new(12, 12, grass);
        let settings = Settings {
            fog_of_war: false,
            seed: 5,
            end_turn: 500,
        };
        let rng = ChaCha8Rng::seed_from_u64(u64::from(settings.seed));
        let mut world = GameWorld::new(ruleset, settings, map, rng);
        world
            .players
            .push(Player::new(PlayerId(0), "Romans".into(), [1, 2, 3], true, 3));
        world
            .vision
            .push(PlayerVision::new(world.map.num_tiles(), true));
        world.turn = 1;
        world
    }

    #[test]
    fn test_ai_settler_founds_city() {
        let mut world = world_with_ai();
        let settlers = world.ruleset.unit_type_by_name("Settlers").unwrap();
        world.spawn_unit(PlayerId(0), settlers, world.map.index(6, 6));

        run_phase(&mut world, PlayerId(0));

        assert_eq!(world.players[0].cities.len(), 1);
        assert!(world.players[0].phase_done);
    }

    #[test]
    fn test_ai_city_picks_production_and_research() {
        let mut world = world_with_ai();
        let settlers = world.ruleset.unit_type_by_name("Settlers").unwrap();
        world.spawn_unit(PlayerId(0), settlers, world.map.index(6, 6));

        run_phase(&mut world, PlayerId(0));

        let city_id = world.players[0].cities[0];
        assert!(world.city(city_id).unwrap().production.is_some());
        assert!(world.players[0].research.current.is_some());
    }
}
