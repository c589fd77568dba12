//! Turn flow: begin-turn sequence, city updates, scoring
//!
//! The environment layer owns *when* these run; this module owns what
//! they do. `update_city_activities` is the simplified end-of-phase
//! upkeep: city food and production plus the research accrual that rides
//! on city trade. `begin_turn` is the standard turn/phase-begin sequence
//! every new turn goes through.

use crate::core::types::PlayerId;
use crate::world::city::ProductionTarget;
use crate::world::map::{EXTRA_IRRIGATION, EXTRA_MINE, EXTRA_ROAD};
use crate::world::unit::Activity;
use crate::world::{visibility, GameWorld};

/// Food and shields every city produces on top of worked tiles
const CITY_BASE_FOOD: u32 = 1;
const CITY_BASE_SHIELD: u32 = 1;

/// Food eaten per point of city size each turn
const FOOD_PER_CITIZEN: u32 = 2;

/// Tile output after improvements
fn tile_yield(world: &GameWorld, tile_idx: usize) -> (u32, u32, u32) {
    let tile = world.map.tile(tile_idx);
    let terrain = &world.ruleset.terrain[tile.terrain];
    let mut food = terrain.food;
    let mut shield = terrain.shield;
    let mut trade = terrain.trade;

    if tile.has_extra(EXTRA_IRRIGATION) {
        food += terrain.irrigation_food;
    }
    if tile.has_extra(EXTRA_MINE) {
        shield += terrain.mine_shield;
    }
    if tile.has_extra(EXTRA_ROAD) {
        trade += 1;
    }
    (food, shield, trade)
}

/// Total output of a city: its own tile plus the best worked neighbors
///
/// The city works its center tile for free and one neighbor per point of
/// size, preferring food-heavy tiles. Deterministic: ties break on tile
/// index.
pub fn city_yields(world: &GameWorld, city_tile: usize, size: u32) -> (u32, u32, u32) {
    let mut worked: Vec<(usize, (u32, u32, u32))> = world
        .map
        .neighbors(city_tile)
        .map(|idx| (idx, tile_yield(world, idx)))
        .collect();
    worked.sort_by_key(|&(idx, (food, shield, trade))| {
        (std::cmp::Reverse(food * 3 + shield * 2 + trade), idx)
    });

    let (mut food, mut shield, mut trade) = tile_yield(world, city_tile);
    food += CITY_BASE_FOOD;
    shield += CITY_BASE_SHIELD;
    for &(_, (f, s, t)) in worked.iter().take(size as usize) {
        food += f;
        shield += s;
        trade += t;
    }
    (food, shield, trade)
}

/// City production and growth update for one player
///
/// This is deliberately a subset of full end-of-turn upkeep: unit
/// maintenance and unrest are not modeled.
pub fn update_city_activities(world: &mut GameWorld, player: PlayerId) {
    let city_ids: Vec<_> = world.players[player.index()].cities.clone();

    for city_id in city_ids {
        let Some(city) = world.city(city_id) else {
            continue;
        };
        let (food, shield, trade) = city_yields(world, city.tile, city.size);
        let granary = city.granary_size(&world.ruleset);
        let consumed = city.size * FOOD_PER_CITIZEN;

        // Food: grow on a full granary, shrink on famine
        let mut completed_unit: Option<usize> = None;
        let mut completed_building: Option<usize> = None;
        {
            let city = world.city_mut(city_id).expect("fetched above");
            if food >= consumed {
                city.food_stock += food - consumed;
                if city.food_stock >= granary {
                    city.size += 1;
                    city.food_stock = 0;
                }
            } else {
                let deficit = consumed - food;
                if city.food_stock >= deficit {
                    city.food_stock -= deficit;
                } else {
                    city.food_stock = 0;
                    if city.size > 1 {
                        city.size -= 1;
                    }
                }
            }

            // Shields toward the current target
            city.shield_stock += shield;
        }

        // Production completion
        let city = world.city(city_id).expect("fetched above");
        if let (Some(target), Some(cost)) = (city.production, city.production_cost(&world.ruleset))
        {
            if city.shield_stock >= cost {
                match target {
                    ProductionTarget::Unit(type_idx) => completed_unit = Some(type_idx),
                    ProductionTarget::Building(idx) => completed_building = Some(idx),
                }
                let city = world.city_mut(city_id).expect("fetched above");
                city.shield_stock -= cost;
            }
        }

        if let Some(type_idx) = completed_unit {
            let tile = world.city(city_id).expect("fetched above").tile;
            let id = world.spawn_unit(player, type_idx, tile);
            tracing::debug!("city {:?} completed unit {:?}", city_id, id);
        }
        if let Some(idx) = completed_building {
            let city = world.city_mut(city_id).expect("fetched above");
            city.built.insert(idx);
            city.production = None;
            tracing::debug!("city {:?} completed building {}", city_id, idx);
        }

        // Trade: split into gold and bulbs by the player's rates
        let economy = &world.players[player.index()].economy;
        let gold_income = trade * economy.tax_rate / 100;
        let bulbs = trade * economy.science_rate / 100;
        let p = &mut world.players[player.index()];
        p.economy.gold += gold_income as i32;
        p.research.bulbs += bulbs;
    }

    // Research completion
    let p = &mut world.players[player.index()];
    if let Some(tech_idx) = p.research.current {
        let cost = world.ruleset.techs[tech_idx].cost;
        if p.research.bulbs >= cost {
            p.research.bulbs -= cost;
            p.research.known.insert(tech_idx);
            p.research.current = None;
            tracing::debug!(
                "player {} learned {}",
                player.0,
                world.ruleset.techs[tech_idx].name
            );
        }
    }
}

/// Standard turn/phase-begin sequence
///
/// Restores unit movement, advances terrain activities, resets per-turn
/// city flags, recomputes line of sight, refreshes scores, and marks
/// players with nothing left as dead. `first` distinguishes the game's
/// opening turn from a turn advance.
pub fn begin_turn(world: &mut GameWorld, first: bool) {
    if first {
        world.year = world.ruleset.rules.start_year;
    } else {
        world.year += world.ruleset.rules.year_per_turn;
    }

    for player in &mut world.players {
        player.phase_done = false;
    }

    // Unit refresh + activity progress
    let unit_ids: Vec<_> = world
        .players
        .iter()
        .flat_map(|p| p.units.iter().copied())
        .collect();
    for unit_id in unit_ids {
        let Some(unit) = world.unit(unit_id) else {
            continue;
        };
        let def = &world.ruleset.unit_types[unit.type_idx];
        let moves = def.moves;

        let mut finished: Option<(usize, u8)> = None;
        {
            let unit = world.unit_mut(unit_id).expect("fetched above");
            unit.moves_left = moves * crate::world::unit::MOVE_FRAGS;

            match unit.activity {
                Activity::Fortifying => unit.activity = Activity::Fortified,
                Activity::BuildingRoad | Activity::BuildingIrrigation | Activity::BuildingMine
                    if unit.activity_turns_left > 0 =>
                {
                    unit.activity_turns_left -= 1;
                    if unit.activity_turns_left == 0 {
                        let bit = match unit.activity {
                            Activity::BuildingRoad => crate::world::map::EXTRA_ROAD,
                            Activity::BuildingIrrigation => crate::world::map::EXTRA_IRRIGATION,
                            _ => crate::world::map::EXTRA_MINE,
                        };
                        finished = Some((unit.tile, bit));
                        unit.activity = Activity::Idle;
                    }
                }
                _ => {}
            }
        }
        if let Some((tile, bit)) = finished {
            world.map.tile_mut(tile).extras |= bit;
        }
    }

    // Per-turn city flags
    let city_ids: Vec<_> = world
        .players
        .iter()
        .flat_map(|p| p.cities.iter().copied())
        .collect();
    for city_id in city_ids {
        if let Some(city) = world.city_mut(city_id) {
            city.did_buy = false;
            if city.anarchy > 0 {
                city.anarchy -= 1;
            }
        }
    }

    visibility::recompute_visible(world);
    update_scores(world);

    // A player with nothing on the board is out of the game
    if !first {
        for i in 0..world.players.len() {
            let p = &world.players[i];
            if p.is_alive && p.units.is_empty() && p.cities.is_empty() {
                world.players[i].is_alive = false;
                tracing::info!("player {} eliminated", i);
            }
        }
    }

    // Control returns to the start of the phase order
    world.phase = 0;
}

/// Recompute every player's score
pub fn update_scores(world: &mut GameWorld) {
    for i in 0..world.players.len() {
        let p = &world.players[i];
        let citizens: u32 = p
            .cities
            .iter()
            .filter_map(|&id| world.city(id))
            .map(|c| c.size)
            .sum();
        let score = citizens as i32 * 2
            + p.cities.len() as i32 * 3
            + p.units.len() as i32
            + p.research.known.len() as i32 * 3;
        world.players[i].score = score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlayerId;
    use crate::rules::Ruleset;
    use crate::sim::commands::{self, TerrainActivity};
    use crate::world::map::Map;
    use crate::world::player::Player;
    use crate::world::visibility::PlayerVision;
    use crate::world::Settings;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn world_with_player() -> GameWorld {
        let ruleset = Ruleset::load("classic").unwrap();
        let grass = ruleset.terrain_by_name("Grassland").unwrap();
        let map = Map::new(10, 10, grass);
        let settings = Settings {
            fog_of_war: false,
            seed: 1,
            end_turn: 500,
        };
        let rng = ChaCha8Rng::seed_from_u64(u64::from(settings.seed));
        let mut world = GameWorld::new(ruleset, settings, map, rng);
        world
            .players
            .push(Player::new(PlayerId(0), "Romans".into(), [1, 2, 3], false, 0));
        world
            .vision
            .push(PlayerVision::new(world.map.num_tiles(), true));
        world.turn = 1;
        world
    }

    fn founded_city(world: &mut GameWorld) -> crate::core::types::CityId {
        let settlers = world.ruleset.unit_type_by_name("Settlers").unwrap();
        let founder = world.spawn_unit(PlayerId(0), settlers, world.map.index(5, 5));
        commands::found_city(world, founder).unwrap()
    }

    #[test]
    fn test_city_accumulates_shields_and_completes_unit() {
        let mut world = world_with_player();
        let city_id = founded_city(&mut world);
        let warriors = world.ruleset.unit_type_by_name("Warriors").unwrap();
        commands::set_production(
            &mut world,
            city_id,
            crate::world::city::ProductionTarget::Unit(warriors),
        );

        let before_units = world.players[0].units.len();
        for _ in 0..40 {
            update_city_activities(&mut world, PlayerId(0));
            if world.players[0].units.len() > before_units {
                break;
            }
        }
        assert!(
            world.players[0].units.len() > before_units,
            "city never completed a unit"
        );
        let new_unit = *world.players[0].units.last().unwrap();
        assert_eq!(world.unit(new_unit).unwrap().type_idx, warriors);
    }

    #[test]
    fn test_city_growth_fills_granary_then_grows() {
        let mut world = world_with_player();
        let city_id = founded_city(&mut world);

        let mut grew = false;
        for _ in 0..60 {
            update_city_activities(&mut world, PlayerId(0));
            if world.city(city_id).unwrap().size > 1 {
                grew = true;
                break;
            }
        }
        assert!(grew, "city never grew on grassland");
    }

    #[test]
    fn test_begin_turn_restores_moves_and_finishes_roads() {
        let mut world = world_with_player();
        let workers = world.ruleset.unit_type_by_name("Workers").unwrap();
        let digger = world.spawn_unit(PlayerId(0), workers, world.map.index(2, 2));

        commands::start_activity(&mut world, digger, TerrainActivity::Road);
        world.unit_mut(digger).unwrap().moves_left = 0;

        let road_turns = world.ruleset.rules.road_turns;
        for _ in 0..road_turns {
            begin_turn(&mut world, false);
        }

        let tile = world.map.tile(world.map.index(2, 2));
        assert!(tile.has_extra(EXTRA_ROAD));
        let unit = world.unit(digger).unwrap();
        assert_eq!(unit.activity, Activity::Idle);
        assert!(unit.moves_left > 0);
    }

    #[test]
    fn test_research_completes_on_enough_bulbs() {
        let mut world = world_with_player();
        let city_id = founded_city(&mut world);
        let _ = city_id;
        let pottery = world.ruleset.tech_by_name("Pottery").unwrap();
        commands::set_research(&mut world, PlayerId(0), pottery);

        for _ in 0..200 {
            update_city_activities(&mut world, PlayerId(0));
            if world.players[0].research.known.contains(&pottery) {
                break;
            }
        }
        assert!(world.players[0].research.known.contains(&pottery));
        assert_eq!(world.players[0].research.current, None);
    }

    #[test]
    fn test_scores_track_holdings() {
        let mut world = world_with_player();
        update_scores(&mut world);
        let empty_score = world.players[0].score;

        founded_city(&mut world);
        update_scores(&mut world);
        assert!(world.players[0].score > empty_score);
    }
}
