//! Observation snapshotting
//!
//! An [`Observation`] is a caller-owned, point-in-time snapshot of the
//! world as the controlled player sees it. The same value can be handed
//! back for every call: internal buffers are reused and only reallocated
//! when capacity is insufficient, and they are never shrunk, so a tight
//! step loop settles into zero allocation. Addresses are not stable
//! across calls.
//!
//! Filling is a two-pass affair: a counting pass over every player's
//! units and cities sizes the buffers, then a fill pass writes them.
//! Buffer sizes depend on the observation itself, so counting first is
//! what keeps the fill pass reallocation-free.

use serde::Serialize;

use crate::core::types::{CityId, PlayerId, UnitId};
use crate::env::advance;
use crate::world::city::ProductionTarget;
use crate::world::GameWorld;

/// One map cell as the controlled player sees it
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TileObs {
    /// Terrain catalog index
    pub terrain: i32,
    /// Owning player index, -1 if unclaimed
    pub owner: i32,
    pub has_city: bool,
    pub has_unit: bool,
    /// Currently in line of sight
    pub visible: bool,
    /// Ever seen
    pub explored: bool,
    /// Bitmask of `EXTRA_*` improvements
    pub extras: u8,
}

/// One visible unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UnitObs {
    pub id: UnitId,
    /// Unit-type catalog index
    pub type_idx: i32,
    pub owner: i32,
    pub tile_index: usize,
    pub hp: i32,
    pub max_hp: i32,
    /// Movement remaining, in fragments
    pub moves_left: i32,
    pub veteran_level: i32,
    pub fortified: bool,
}

/// One visible city
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CityObs {
    pub id: CityId,
    pub owner: i32,
    pub tile_index: usize,
    pub size: i32,
    pub food_stock: i32,
    pub shield_stock: i32,
    /// Catalog index of the production target, -1 if none
    pub producing_type: i32,
    pub producing_is_unit: bool,
    /// Estimated turns to finish, -1 if unknowable
    pub turns_to_complete: i32,
}

/// One player, always present regardless of visibility
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlayerObs {
    pub index: i32,
    pub is_alive: bool,
    pub is_ai: bool,
    pub gold: i32,
    pub tax_rate: i32,
    pub science_rate: i32,
    pub luxury_rate: i32,
    /// Tech being researched, -1 if none
    pub researching: i32,
    pub research_bulbs: i32,
    pub num_cities: i32,
    pub num_units: i32,
    pub score: i32,
}

/// Full game observation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Observation {
    pub map_width: u32,
    pub map_height: u32,
    pub turn: u32,
    pub year: i32,
    pub phase: u32,
    /// Index of the player whose phase is running
    pub current_player: i32,
    pub controlled_player: i32,
    /// One entry per map cell; index = y * width + x
    pub tiles: Vec<TileObs>,
    /// Units on tiles known to the controlled player
    pub units: Vec<UnitObs>,
    /// Cities on tiles known to the controlled player
    pub cities: Vec<CityObs>,
    pub players: Vec<PlayerObs>,
    pub game_over: bool,
    /// Winner player index, -1 while undecided
    pub winner: i32,
}

impl Observation {
    pub fn new() -> Self {
        Self {
            winner: -1,
            ..Self::default()
        }
    }

    /// Reset content, keeping buffer capacity for reuse
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.units.clear();
        self.cities.clear();
        self.players.clear();
        self.map_width = 0;
        self.map_height = 0;
        self.turn = 0;
        self.year = 0;
        self.phase = 0;
        self.current_player = 0;
        self.controlled_player = 0;
        self.game_over = false;
        self.winner = -1;
    }
}

fn player_index(id: Option<PlayerId>) -> i32 {
    id.map_or(-1, |p| p.index() as i32)
}

/// Snapshot the world into `obs` from the controlled player's viewpoint
pub(crate) fn build(world: &GameWorld, controlled: PlayerId, obs: &mut Observation) {
    obs.clear();

    obs.map_width = world.map.width();
    obs.map_height = world.map.height();
    obs.turn = world.turn;
    obs.year = world.year;
    obs.phase = world.phase;
    obs.current_player = world.phase as i32;
    obs.controlled_player = controlled.index() as i32;

    let vision = &world.vision[controlled.index()];

    // Tiles: always the full map, with per-tile visibility flags
    let num_tiles = world.map.num_tiles();
    grow_for(&mut obs.tiles, num_tiles, "tile");
    for idx in 0..num_tiles {
        let tile = world.map.tile(idx);
        obs.tiles.push(TileObs {
            terrain: tile.terrain as i32,
            owner: player_index(tile.owner),
            has_city: tile.city.is_some(),
            has_unit: !tile.units.is_empty(),
            visible: vision.is_visible(idx),
            explored: vision.is_known(idx),
            extras: tile.extras,
        });
    }

    // Counting pass: size buffers before filling them
    let total_units: usize = world.players.iter().map(|p| p.units.len()).sum();
    let total_cities: usize = world.players.iter().map(|p| p.cities.len()).sum();
    grow_for(&mut obs.units, total_units, "unit");
    grow_for(&mut obs.cities, total_cities, "city");

    // Fill pass: player-index order, creation order within a player
    for player in &world.players {
        for &unit_id in &player.units {
            let Some(unit) = world.unit(unit_id) else {
                continue;
            };
            if !vision.is_known(unit.tile) {
                continue;
            }
            obs.units.push(UnitObs {
                id: unit.id,
                type_idx: unit.type_idx as i32,
                owner: unit.owner.index() as i32,
                tile_index: unit.tile,
                hp: unit.hp as i32,
                max_hp: unit.max_hp as i32,
                moves_left: unit.moves_left as i32,
                veteran_level: unit.veteran as i32,
                fortified: unit.is_fortified(),
            });
        }

        for &city_id in &player.cities {
            let Some(city) = world.city(city_id) else {
                continue;
            };
            if !vision.is_known(city.tile) {
                continue;
            }
            let (producing_type, producing_is_unit) = match city.production {
                Some(ProductionTarget::Unit(idx)) => (idx as i32, true),
                Some(ProductionTarget::Building(idx)) => (idx as i32, false),
                None => (-1, false),
            };
            let (_, shield_surplus, _) =
                crate::sim::turn::city_yields(world, city.tile, city.size);
            obs.cities.push(CityObs {
                id: city.id,
                owner: city.owner.index() as i32,
                tile_index: city.tile,
                size: city.size as i32,
                food_stock: city.food_stock as i32,
                shield_stock: city.shield_stock as i32,
                producing_type,
                producing_is_unit,
                turns_to_complete: city.turns_to_complete(&world.ruleset, shield_surplus),
            });
        }
    }

    // Players: every roster entry, visible or not
    grow_for(&mut obs.players, world.num_players(), "player");
    for player in &world.players {
        obs.players.push(PlayerObs {
            index: player.id.index() as i32,
            is_alive: player.is_alive,
            is_ai: player.is_ai,
            gold: player.economy.gold,
            tax_rate: player.economy.tax_rate as i32,
            science_rate: player.economy.science_rate as i32,
            luxury_rate: player.economy.luxury_rate as i32,
            researching: player.research.current.map_or(-1, |t| t as i32),
            research_bulbs: player.research.bulbs as i32,
            num_cities: player.cities.len() as i32,
            num_units: player.units.len() as i32,
            score: player.score,
        });
    }

    let (game_over, winner) = advance::check_game_over(world);
    obs.game_over = game_over;
    obs.winner = winner;
}

/// Grow-only capacity management with a debug trace, as elsewhere in the
/// buffer-reuse paths
fn grow_for<T>(buffer: &mut Vec<T>, needed: usize, label: &str) {
    if buffer.capacity() < needed {
        tracing::debug!("grew {} buffer to {} capacity", label, needed);
        buffer.reserve(needed - buffer.len());
    }
}
