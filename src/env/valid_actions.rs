//! Legal-action enumeration
//!
//! A [`ValidActions`] is computed from scratch on every call: the mask is
//! state-dependent and nothing here is incremental. The value is owned by
//! the caller and dropped as a unit.

use serde::Serialize;

use crate::core::types::{CityId, Direction, PlayerId, UnitId};
use crate::sim::commands::{self, TerrainActivity};
use crate::sim::movement;
use crate::world::GameWorld;

/// Per-unit capability mask
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UnitActionMask {
    pub unit_id: UnitId,
    /// Per-direction: destination enterable by ordinary movement OR
    /// hosting an attackable enemy (attack overlaps move by design; the
    /// dispatcher picks the verb at the destination)
    pub can_move: [bool; 8],
    /// Tile indices of attackable adjacent stacks
    pub attackable_tiles: Vec<usize>,
    pub can_fortify: bool,
    pub can_build_city: bool,
    pub can_build_road: bool,
    pub can_build_irrigation: bool,
    pub can_build_mine: bool,
    pub can_disband: bool,
}

/// Per-city capability mask
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CityActionMask {
    pub city_id: CityId,
    /// Unit-type catalog indices buildable right now
    pub buildable_units: Vec<usize>,
    /// Building catalog indices buildable right now
    pub buildable_buildings: Vec<usize>,
    pub can_buy: bool,
}

/// All legal discrete actions for the controlled player
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidActions {
    pub units: Vec<UnitActionMask>,
    pub cities: Vec<CityActionMask>,
    /// Techs whose prerequisites are known but which are not
    pub researchable_techs: Vec<usize>,
    /// Always true while a game is running
    pub can_end_turn: bool,
}

/// Enumerate every legal action for the controlled player
pub(crate) fn enumerate(world: &GameWorld, controlled: PlayerId) -> ValidActions {
    let mut actions = ValidActions {
        can_end_turn: true,
        ..ValidActions::default()
    };

    let player = &world.players[controlled.index()];

    for &unit_id in &player.units {
        let Some(unit) = world.unit(unit_id) else {
            continue;
        };
        let attack = world.ruleset.unit_types[unit.type_idx].attack;
        let mut mask = UnitActionMask {
            unit_id,
            ..UnitActionMask::default()
        };

        if unit.moves_left > 0 {
            for dir in Direction::ALL {
                let Some(dst) = world.map.step(unit.tile, dir) else {
                    continue;
                };
                if movement::can_enter_tile(world, unit_id, dst) {
                    mask.can_move[dir.index()] = true;
                }
                if attack > 0 && movement::attackable_tile(world, dst, controlled) {
                    // An attack-capable direction is also move-capable
                    mask.can_move[dir.index()] = true;
                    mask.attackable_tiles.push(dst);
                }
            }
        }

        mask.can_fortify = commands::can_fortify(world, unit_id);
        mask.can_build_city = commands::can_found_city(world, unit_id);
        mask.can_build_road = commands::can_do_activity(world, unit_id, TerrainActivity::Road);
        mask.can_build_irrigation =
            commands::can_do_activity(world, unit_id, TerrainActivity::Irrigation);
        mask.can_build_mine = commands::can_do_activity(world, unit_id, TerrainActivity::Mine);
        mask.can_disband = commands::can_disband(world, unit_id);

        actions.units.push(mask);
    }

    for &city_id in &player.cities {
        let Some(city) = world.city(city_id) else {
            continue;
        };
        let mut mask = CityActionMask {
            city_id,
            ..CityActionMask::default()
        };

        // Two linear scans over the engine catalogs, re-evaluating
        // "can build now" against every defined type
        for idx in 0..world.ruleset.num_unit_types() {
            if commands::can_build_unit_now(world, city, idx) {
                mask.buildable_units.push(idx);
            }
        }
        for idx in 0..world.ruleset.num_buildings() {
            if commands::can_build_building_now(world, city, idx) {
                mask.buildable_buildings.push(idx);
            }
        }

        mask.can_buy = commands::can_buy(world, city_id);
        actions.cities.push(mask);
    }

    for idx in 0..world.ruleset.num_techs() {
        if player.research.can_research(&world.ruleset, idx) {
            actions.researchable_techs.push(idx);
        }
    }

    actions
}
