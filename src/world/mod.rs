//! Live game world: map, players, units, cities, visibility
//!
//! [`GameWorld`] is the arena every other layer works against. Entities
//! are addressed by stable integer ids; all relationships (owner,
//! occupant, location) are id lookups into the arena, never embedded
//! references, so destroying a unit or founding a city can never leave a
//! dangling pointer behind.

pub mod city;
pub mod map;
pub mod mapgen;
pub mod player;
pub mod unit;
pub mod visibility;

use ahash::AHashMap;
use rand_chacha::ChaCha8Rng;

use crate::core::types::{CityId, PlayerId, UnitId};
use crate::rules::Ruleset;
use crate::world::city::City;
use crate::world::map::Map;
use crate::world::player::Player;
use crate::world::unit::Unit;
use crate::world::visibility::PlayerVision;

/// Per-game settings fixed at new-game time
#[derive(Debug, Clone)]
pub struct Settings {
    pub fog_of_war: bool,
    /// Seed actually used (resolved when the config seed was 0)
    pub seed: u32,
    /// Turn limit; reaching it ends the game on score
    pub end_turn: u32,
}

/// The complete mutable game state for one running game
#[derive(Debug)]
pub struct GameWorld {
    pub ruleset: Ruleset,
    pub settings: Settings,
    pub map: Map,
    /// Players in roster order; index == `PlayerId`
    pub players: Vec<Player>,
    /// Per-player fog-of-war state, parallel to `players`
    pub vision: Vec<PlayerVision>,
    units: AHashMap<UnitId, Unit>,
    cities: AHashMap<CityId, City>,
    next_unit_id: u32,
    next_city_id: u32,
    pub rng: ChaCha8Rng,
    pub turn: u32,
    pub year: i32,
    /// Index of the player whose phase is running (strict alternation)
    pub phase: u32,
}

impl GameWorld {
    /// Create an empty world around an already-generated map
    ///
    /// The RNG is handed over from map generation so the whole game runs
    /// on one seeded stream.
    pub fn new(ruleset: Ruleset, settings: Settings, map: Map, rng: ChaCha8Rng) -> Self {
        Self {
            ruleset,
            settings,
            map,
            players: Vec::new(),
            vision: Vec::new(),
            units: AHashMap::new(),
            cities: AHashMap::new(),
            next_unit_id: 1,
            next_city_id: 1,
            rng,
            turn: 0,
            year: 0,
            phase: 0,
        }
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.index())
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id.index())
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(&id)
    }

    pub fn city_mut(&mut self, id: CityId) -> Option<&mut City> {
        self.cities.get_mut(&id)
    }

    /// Spawn a unit of `type_idx` for `owner` at `tile`, wiring up the
    /// tile occupant list, the owner's creation-order list, and vision.
    pub fn spawn_unit(&mut self, owner: PlayerId, type_idx: usize, tile: usize) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;

        let unit = Unit::new(id, type_idx, owner, tile, &self.ruleset.unit_types[type_idx]);
        let vision_range = unit.vision;
        self.units.insert(id, unit);
        self.map.tile_mut(tile).units.push(id);
        self.players[owner.index()].units.push(id);

        visibility::reveal_around(self, owner, tile, vision_range);
        id
    }

    /// Remove a unit from the arena and every list that references it
    pub fn remove_unit(&mut self, id: UnitId) {
        let Some(unit) = self.units.remove(&id) else {
            return;
        };
        let tile = self.map.tile_mut(unit.tile);
        tile.units.retain(|&u| u != id);
        self.players[unit.owner.index()].units.retain(|&u| u != id);
    }

    /// Register a city created by [`crate::sim::commands::found_city`]
    pub fn register_city(&mut self, city: City) -> CityId {
        let id = CityId(self.next_city_id);
        self.next_city_id += 1;

        let owner = city.owner;
        let tile = city.tile;
        self.cities.insert(id, City { id, ..city });
        self.map.tile_mut(tile).city = Some(id);
        self.players[owner.index()].cities.push(id);

        let radius = self.ruleset.rules.city_vision_radius;
        visibility::reveal_around(self, owner, tile, radius);
        id
    }

    /// Hand a city over to a new owner (conquest)
    pub fn transfer_city(&mut self, id: CityId, to: PlayerId) {
        let Some(city) = self.cities.get_mut(&id) else {
            return;
        };
        let from = city.owner;
        if from == to {
            return;
        }
        city.owner = to;
        let tile = city.tile;
        self.map.tile_mut(tile).owner = Some(to);
        self.players[from.index()].cities.retain(|&c| c != id);
        self.players[to.index()].cities.push(id);

        let radius = self.ruleset.rules.city_vision_radius;
        visibility::reveal_around(self, to, tile, radius);
    }

    /// Move a unit's tile bookkeeping (occupant lists + location)
    ///
    /// Rule checks live in `sim::movement`; this only rewires the arena.
    pub fn relocate_unit(&mut self, id: UnitId, to: usize) {
        let Some(unit) = self.units.get_mut(&id) else {
            return;
        };
        let from = unit.tile;
        unit.tile = to;
        let owner = unit.owner;
        let vision_range = unit.vision;
        self.map.tile_mut(from).units.retain(|&u| u != id);
        self.map.tile_mut(to).units.push(id);

        visibility::reveal_around(self, owner, to, vision_range);
    }

    /// Total units across all players (counting pass helper)
    pub fn total_units(&self) -> usize {
        self.units.len()
    }

    pub fn total_cities(&self) -> usize {
        self.cities.len()
    }
}
