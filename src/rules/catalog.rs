//! Ruleset catalogs: terrain, unit types, buildings, technologies, nations
//!
//! A [`Ruleset`] is the static rule data for one game: everything the
//! engine consults but never mutates. Catalog entries are addressed by
//! dense index; those indices are the type ids that appear in
//! observations and actions.

use serde::{Deserialize, Serialize};

/// Terrain class for one tile kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainDef {
    pub name: String,
    /// Movement points required to enter
    pub move_cost: u32,
    /// Defense multiplier in percent (100 = no bonus)
    pub defense_bonus: u32,
    pub food: u32,
    pub shield: u32,
    pub trade: u32,
    #[serde(default)]
    pub is_water: bool,
    #[serde(default)]
    pub can_found_city: bool,
    #[serde(default)]
    pub can_irrigate: bool,
    /// Extra food once irrigated
    #[serde(default)]
    pub irrigation_food: u32,
    #[serde(default)]
    pub can_mine: bool,
    /// Extra shields once mined
    #[serde(default)]
    pub mine_shield: u32,
    /// Share of generated land assigned to this terrain (water: ignored)
    #[serde(default)]
    pub fraction: f32,
}

/// One buildable unit kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTypeDef {
    pub name: String,
    /// Production cost in shields
    pub cost: u32,
    pub attack: u32,
    pub defense: u32,
    pub hp: u32,
    /// Movement points per turn
    pub moves: u32,
    /// Tiles revealed around the unit
    #[serde(default = "default_vision")]
    pub vision: u32,
    #[serde(default)]
    pub can_found_city: bool,
    /// Whether the unit can work terrain (roads, irrigation, mines)
    #[serde(default)]
    pub can_improve_terrain: bool,
    /// Technology gating production, by name
    #[serde(default)]
    pub requires_tech: Option<String>,
    /// Resolved index of `requires_tech`, filled at load
    #[serde(skip)]
    pub requires_tech_idx: Option<usize>,
}

fn default_vision() -> u32 {
    1
}

/// One buildable city improvement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingDef {
    pub name: String,
    /// Production cost in shields
    pub cost: u32,
    #[serde(default)]
    pub requires_tech: Option<String>,
    #[serde(skip)]
    pub requires_tech_idx: Option<usize>,
}

/// One technology node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechDef {
    pub name: String,
    /// Research cost in bulbs
    pub cost: u32,
    /// Prerequisite technologies, by name
    #[serde(default)]
    pub requires: Vec<String>,
    /// Resolved indices of `requires`, filled at load
    #[serde(skip)]
    pub requires_idx: Vec<usize>,
}

/// Scalar game constants for one ruleset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRules {
    /// Starting treasury for every player
    pub initial_gold: i32,
    /// Units granted to each player at game start, by type name
    pub start_units: Vec<String>,
    /// Technologies known to every player at game start, by name
    #[serde(default)]
    pub initial_techs: Vec<String>,
    /// Food needed per point of city size before the city grows
    pub granary_food_per_size: u32,
    /// Gold per missing shield when buying production
    pub buy_gold_per_shield: u32,
    /// Turns of work to finish a road
    pub road_turns: u32,
    /// Turns of work to finish irrigation
    pub irrigation_turns: u32,
    /// Turns of work to finish a mine
    pub mine_turns: u32,
    /// Turn limit; reaching it ends the game on score
    pub end_turn: u32,
    pub start_year: i32,
    pub year_per_turn: i32,
    /// Minimum distance between cities (Chebyshev)
    pub min_city_distance: u32,
    /// Tiles revealed around a city
    pub city_vision_radius: u32,
    /// Percentage of the map that is land
    pub land_percent: u32,
}

/// The static rule data for one game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ruleset {
    pub name: String,
    pub rules: GameRules,
    pub terrain: Vec<TerrainDef>,
    pub unit_types: Vec<UnitTypeDef>,
    pub buildings: Vec<BuildingDef>,
    pub techs: Vec<TechDef>,
    /// Nation names assigned to players in pick order
    pub nations: Vec<String>,
    /// Player colors assigned alongside nations
    pub colors: Vec<[u8; 3]>,
    /// Shared pool of suggested city names
    pub city_names: Vec<String>,
}

impl Ruleset {
    pub fn num_terrain(&self) -> usize {
        self.terrain.len()
    }

    pub fn num_unit_types(&self) -> usize {
        self.unit_types.len()
    }

    pub fn num_buildings(&self) -> usize {
        self.buildings.len()
    }

    pub fn num_techs(&self) -> usize {
        self.techs.len()
    }

    pub fn unit_type_name(&self, index: usize) -> Option<&str> {
        self.unit_types.get(index).map(|u| u.name.as_str())
    }

    pub fn building_name(&self, index: usize) -> Option<&str> {
        self.buildings.get(index).map(|b| b.name.as_str())
    }

    pub fn tech_name(&self, index: usize) -> Option<&str> {
        self.techs.get(index).map(|t| t.name.as_str())
    }

    pub fn unit_type_by_name(&self, name: &str) -> Option<usize> {
        self.unit_types.iter().position(|u| u.name == name)
    }

    pub fn building_by_name(&self, name: &str) -> Option<usize> {
        self.buildings.iter().position(|b| b.name == name)
    }

    pub fn tech_by_name(&self, name: &str) -> Option<usize> {
        self.techs.iter().position(|t| t.name == name)
    }

    pub fn terrain_by_name(&self, name: &str) -> Option<usize> {
        self.terrain.iter().position(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_catalog_lookups() {
        let ruleset = Ruleset::load("classic").unwrap();

        let settlers = ruleset.unit_type_by_name("Settlers").unwrap();
        assert!(ruleset.unit_types[settlers].can_found_city);
        assert_eq!(ruleset.unit_type_name(settlers), Some("Settlers"));

        assert!(ruleset.num_terrain() > 0);
        assert!(ruleset.num_unit_types() > 0);
        assert!(ruleset.num_buildings() > 0);
        assert!(ruleset.num_techs() > 0);

        assert_eq!(ruleset.unit_type_name(ruleset.num_unit_types()), None);
    }
}
