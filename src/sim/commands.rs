//! Engine command primitives
//!
//! These are the per-action execution primitives the environment layer
//! dispatches to: founding cities, terrain-improvement activities,
//! disbanding, production changes, buying, and research targeting. Each
//! reports success through the resulting state change; an ineligible
//! request simply returns false and mutates nothing.

use crate::core::types::{CityId, PlayerId, UnitId};
use crate::world::city::{City, ProductionTarget};
use crate::world::map::{EXTRA_IRRIGATION, EXTRA_MINE, EXTRA_ROAD};
use crate::world::unit::Activity;
use crate::world::GameWorld;

/// Terrain-improvement activities a worker-class unit can start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerrainActivity {
    Road,
    Irrigation,
    Mine,
}

impl TerrainActivity {
    fn unit_activity(self) -> Activity {
        match self {
            TerrainActivity::Road => Activity::BuildingRoad,
            TerrainActivity::Irrigation => Activity::BuildingIrrigation,
            TerrainActivity::Mine => Activity::BuildingMine,
        }
    }

    pub fn extra_bit(self) -> u8 {
        match self {
            TerrainActivity::Road => EXTRA_ROAD,
            TerrainActivity::Irrigation => EXTRA_IRRIGATION,
            TerrainActivity::Mine => EXTRA_MINE,
        }
    }

    fn work_turns(self, world: &GameWorld) -> u32 {
        let rules = &world.ruleset.rules;
        match self {
            TerrainActivity::Road => rules.road_turns,
            TerrainActivity::Irrigation => rules.irrigation_turns,
            TerrainActivity::Mine => rules.mine_turns,
        }
    }
}

/// Suggest a name for the player's next city
///
/// First unused name from the shared pool, falling back to a numbered
/// name once the pool runs dry.
pub fn suggest_city_name(world: &GameWorld, player: PlayerId) -> String {
    let in_use = |name: &str| {
        world.players.iter().any(|p| {
            p.cities
                .iter()
                .filter_map(|&id| world.city(id))
                .any(|c| c.name == name)
        })
    };

    for name in &world.ruleset.city_names {
        if !in_use(name) {
            return name.clone();
        }
    }
    let player_name = &world.players[player.index()].nation;
    format!("{} City {}", player_name, world.total_cities() + 1)
}

/// Whether `unit_id` may found a city right now
pub fn can_found_city(world: &GameWorld, unit_id: UnitId) -> bool {
    let Some(unit) = world.unit(unit_id) else {
        return false;
    };
    if !world.ruleset.unit_types[unit.type_idx].can_found_city || unit.moves_left == 0 {
        return false;
    }
    let tile = world.map.tile(unit.tile);
    if !world.ruleset.terrain[tile.terrain].can_found_city || tile.city.is_some() {
        return false;
    }
    // Enforce minimum city spacing
    let min_distance = world.ruleset.rules.min_city_distance;
    for player in &world.players {
        for &city_id in &player.cities {
            if let Some(city) = world.city(city_id) {
                if world.map.distance(city.tile, unit.tile) < min_distance {
                    return false;
                }
            }
        }
    }
    true
}

/// Found a city at the unit's tile, consuming the founder
pub fn found_city(world: &mut GameWorld, unit_id: UnitId) -> Option<CityId> {
    if !can_found_city(world, unit_id) {
        return None;
    }
    let (owner, tile) = {
        let unit = world.unit(unit_id)?;
        (unit.owner, unit.tile)
    };

    let name = suggest_city_name(world, owner);
    world.remove_unit(unit_id);

    let city = City::new(owner, tile, name, world.turn);
    let city_id = world.register_city(city);

    // Claim the city tile and its surroundings
    world.map.tile_mut(tile).owner = Some(owner);
    let neighbors: Vec<usize> = world.map.neighbors(tile).collect();
    for n in neighbors {
        let t = world.map.tile_mut(n);
        if t.owner.is_none() {
            t.owner = Some(owner);
        }
    }

    tracing::debug!(
        "founded city {:?} for player {} at tile {}",
        city_id,
        owner.0,
        tile
    );
    Some(city_id)
}

/// Resolve the concrete target improvement for a road request
///
/// Roads have exactly one tier here; once the tile carries it there is
/// no further target, so the capability disappears.
pub fn road_target(world: &GameWorld, tile: usize) -> Option<u8> {
    let t = world.map.tile(tile);
    if world.ruleset.terrain[t.terrain].is_water || t.has_extra(EXTRA_ROAD) {
        None
    } else {
        Some(EXTRA_ROAD)
    }
}

/// Whether the unit can start the given terrain activity on its tile
pub fn can_do_activity(world: &GameWorld, unit_id: UnitId, activity: TerrainActivity) -> bool {
    let Some(unit) = world.unit(unit_id) else {
        return false;
    };
    if !world.ruleset.unit_types[unit.type_idx].can_improve_terrain || unit.moves_left == 0 {
        return false;
    }
    if unit.activity == activity.unit_activity() {
        return false; // already working on it
    }

    let tile = world.map.tile(unit.tile);
    let terrain = &world.ruleset.terrain[tile.terrain];
    match activity {
        TerrainActivity::Road => road_target(world, unit.tile).is_some(),
        TerrainActivity::Irrigation => terrain.can_irrigate && !tile.has_extra(EXTRA_IRRIGATION),
        TerrainActivity::Mine => terrain.can_mine && !tile.has_extra(EXTRA_MINE),
    }
}

/// Begin a terrain activity; work completes over the following turns
pub fn start_activity(world: &mut GameWorld, unit_id: UnitId, activity: TerrainActivity) -> bool {
    if !can_do_activity(world, unit_id, activity) {
        return false;
    }
    let turns = activity.work_turns(world);
    if let Some(unit) = world.unit_mut(unit_id) {
        unit.activity = activity.unit_activity();
        unit.activity_turns_left = turns;
        true
    } else {
        false
    }
}

/// Request the fortify activity
pub fn fortify(world: &mut GameWorld, unit_id: UnitId) -> bool {
    if !can_fortify(world, unit_id) {
        return false;
    }
    if let Some(unit) = world.unit_mut(unit_id) {
        unit.activity = Activity::Fortifying;
        unit.activity_turns_left = 0;
        true
    } else {
        false
    }
}

pub fn can_fortify(world: &GameWorld, unit_id: UnitId) -> bool {
    let Some(unit) = world.unit(unit_id) else {
        return false;
    };
    world.ruleset.unit_types[unit.type_idx].defense > 0
        && unit.activity != Activity::Fortified
        && unit.activity != Activity::Fortifying
}

/// Disband eligibility: the action must be structurally available and
/// currently enabled against the unit itself
pub fn can_disband(world: &GameWorld, unit_id: UnitId) -> bool {
    world.unit(unit_id).is_some()
}

/// Remove the unit from play
pub fn disband(world: &mut GameWorld, unit_id: UnitId) -> bool {
    if !can_disband(world, unit_id) {
        return false;
    }
    world.remove_unit(unit_id);
    true
}

/// Whether the city could start building this unit type right now
pub fn can_build_unit_now(world: &GameWorld, city: &City, type_idx: usize) -> bool {
    let Some(def) = world.ruleset.unit_types.get(type_idx) else {
        return false;
    };
    match def.requires_tech_idx {
        Some(tech) => world.players[city.owner.index()]
            .research
            .known
            .contains(&tech),
        None => true,
    }
}

/// Whether the city could start building this improvement right now
pub fn can_build_building_now(world: &GameWorld, city: &City, building_idx: usize) -> bool {
    let Some(def) = world.ruleset.buildings.get(building_idx) else {
        return false;
    };
    if city.built.contains(&building_idx) {
        return false;
    }
    match def.requires_tech_idx {
        Some(tech) => world.players[city.owner.index()]
            .research
            .known
            .contains(&tech),
        None => true,
    }
}

/// Set the city's production target
pub fn set_production(world: &mut GameWorld, city_id: CityId, target: ProductionTarget) -> bool {
    let Some(city) = world.city(city_id) else {
        return false;
    };
    let allowed = match target {
        ProductionTarget::Unit(idx) => can_build_unit_now(world, city, idx),
        ProductionTarget::Building(idx) => can_build_building_now(world, city, idx),
    };
    if !allowed {
        return false;
    }
    if let Some(city) = world.city_mut(city_id) {
        city.production = Some(target);
        true
    } else {
        false
    }
}

/// Full buy-eligibility conjunction, enforced engine-side
pub fn can_buy(world: &GameWorld, city_id: CityId) -> bool {
    let Some(city) = world.city(city_id) else {
        return false;
    };
    let Some(cost) = city.production_cost(&world.ruleset) else {
        return false;
    };
    let Some(buy_cost) = city.buy_cost(&world.ruleset) else {
        return false;
    };
    let gold = world.players[city.owner.index()].economy.gold;

    city.turn_founded != world.turn
        && !city.did_buy
        && city.shield_stock < cost
        && gold >= buy_cost as i32
        && (!matches!(city.production, Some(ProductionTarget::Unit(_))) || city.anarchy == 0)
}

/// Buy out the remaining production shields
pub fn buy(world: &mut GameWorld, city_id: CityId) -> bool {
    if !can_buy(world, city_id) {
        return false;
    }
    let (owner, buy_cost, full_cost) = {
        let city = world.city(city_id).expect("checked by can_buy");
        (
            city.owner,
            city.buy_cost(&world.ruleset).expect("checked by can_buy"),
            city.production_cost(&world.ruleset).expect("checked by can_buy"),
        )
    };
    world.players[owner.index()].economy.gold -= buy_cost as i32;
    if let Some(city) = world.city_mut(city_id) {
        city.shield_stock = full_cost;
        city.did_buy = true;
    }
    true
}

/// Set the player's research target
pub fn set_research(world: &mut GameWorld, player: PlayerId, tech_idx: usize) -> bool {
    let Some(p) = world.player(player) else {
        return false;
    };
    if !p.research.can_research(&world.ruleset, tech_idx) {
        return false;
    }
    let p = world.player_mut(player).expect("checked above");
    p.research.current = Some(tech_idx);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PlayerId;
    use crate::rules::Ruleset;
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

    #[test]
    fn test_found_city_consumes_settler() {
        let mut world = world_with_player();
        let settlers = world.ruleset.unit_type_by_name("Settlers").unwrap();
        let unit = world.spawn_unit(PlayerId(0), settlers, world.map.index(5, 5));

        let city_id = found_city(&mut world, unit).unwrap();
        assert!(world.unit(unit).is_none());
        let city = world.city(city_id).unwrap();
        assert_eq!(city.tile, world.map.index(5, 5));
        assert_eq!(world.players[0].cities, vec![city_id]);
    }

    #[test]
    fn test_city_spacing_enforced() {
        let mut world = world_with_player();
        let settlers = world.ruleset.unit_type_by_name("Settlers").unwrap();
        let first = world.spawn_unit(PlayerId(0), settlers, world.map.index(5, 5));
        found_city(&mut world, first).unwrap();

        let second = world.spawn_unit(PlayerId(0), settlers, world.map.index(5, 6));
        assert!(!can_found_city(&world, second));
        assert!(found_city(&mut world, second).is_none());

        let far = world.spawn_unit(PlayerId(0), settlers, world.map.index(8, 8));
        assert!(can_found_city(&world, far));
    }

    #[test]
    fn test_warrior_cannot_found() {
        let mut world = world_with_player();
        let warriors = world.ruleset.unit_type_by_name("Warriors").unwrap();
        let unit = world.spawn_unit(PlayerId(0), warriors, world.map.index(5, 5));
        assert!(!can_found_city(&world, unit));
    }

    #[test]
    fn test_road_target_resolution() {
        let mut world = world_with_player();
        let tile = world.map.index(2, 2);
        assert_eq!(road_target(&world, tile), Some(EXTRA_ROAD));

        world.map.tile_mut(tile).extras |= EXTRA_ROAD;
        assert_eq!(road_target(&world, tile), None);
    }

    #[test]
    fn test_activity_requires_worker() {
        let mut world = world_with_player();
        let warriors = world.ruleset.unit_type_by_name("Warriors").unwrap();
        let workers = world.ruleset.unit_type_by_name("Workers").unwrap();
        let fighter = world.spawn_unit(PlayerId(0), warriors, world.map.index(2, 2));
        let digger = world.spawn_unit(PlayerId(0), workers, world.map.index(3, 3));

        assert!(!can_do_activity(&world, fighter, TerrainActivity::Road));
        assert!(can_do_activity(&world, digger, TerrainActivity::Road));
        assert!(start_activity(&mut world, digger, TerrainActivity::Road));
        assert_eq!(
            world.unit(digger).unwrap().activity,
            Activity::BuildingRoad
        );
    }

    #[test]
    fn test_buy_deducts_gold_and_fills_stock() {
        let mut world = world_with_player();
        let settlers = world.ruleset.unit_type_by_name("Settlers").unwrap();
        let warriors = world.ruleset.unit_type_by_name("Warriors").unwrap();
        let founder = world.spawn_unit(PlayerId(0), settlers, world.map.index(5, 5));
        let city_id = found_city(&mut world, founder).unwrap();

        // Founded this turn: buying is blocked
        world.players[0].economy.gold = 1000;
        set_production(&mut world, city_id, ProductionTarget::Unit(warriors));
        assert!(!can_buy(&world, city_id));

        world.turn += 1;
        assert!(can_buy(&world, city_id));
        let cost = world
            .city(city_id)
            .unwrap()
            .buy_cost(&world.ruleset)
            .unwrap();
        assert!(buy(&mut world, city_id));
        assert_eq!(world.players[0].economy.gold, 1000 - cost as i32);
        assert!(world.city(city_id).unwrap().did_buy);
        assert!(!can_buy(&world, city_id));
    }

    #[test]
    fn test_set_production_respects_tech_gate() {
        let mut world = world_with_player();
        let settlers = world.ruleset.unit_type_by_name("Settlers").unwrap();
        let legion = world.ruleset.unit_type_by_name("Legion").unwrap();
        let founder = world.spawn_unit(PlayerId(0), settlers, world.map.index(5, 5));
        let city_id = found_city(&mut world, founder).unwrap();

        assert!(!set_production(
            &mut world,
            city_id,
            ProductionTarget::Unit(legion)
        ));

        let bronze = world.ruleset.tech_by_name("Bronze Working").unwrap();
        let warrior_code = world.ruleset.tech_by_name("Warrior Code").unwrap();
        let iron = world.ruleset.tech_by_name("Iron Working").unwrap();
        let research = &mut world.players[0].research;
        research.known.insert(bronze);
        research.known.insert(warrior_code);
        research.known.insert(iron);

        assert!(set_production(
            &mut world,
            city_id,
            ProductionTarget::Unit(legion)
        ));
    }

    #[test]
    fn test_set_research_needs_prereqs() {
        let mut world = world_with_player();
        let writing = world.ruleset.tech_by_name("Writing").unwrap();
        let pottery = world.ruleset.tech_by_name("Pottery").unwrap();

        assert!(!set_research(&mut world, PlayerId(0), writing));
        assert!(set_research(&mut world, PlayerId(0), pottery));
        assert_eq!(world.players[0].research.current, Some(pottery));
    }
}
