//! City state, production targets, and cost helpers

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::types::{CityId, PlayerId};
use crate::rules::Ruleset;

/// What a city is currently producing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductionTarget {
    /// Unit-type catalog index
    Unit(usize),
    /// Building catalog index
    Building(usize),
}

/// One city in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub owner: PlayerId,
    /// Tile the city sits on
    pub tile: usize,
    pub name: String,
    /// Population size; never drops below 1
    pub size: u32,
    pub food_stock: u32,
    pub shield_stock: u32,
    pub production: Option<ProductionTarget>,
    /// Buildings finished in this city, by catalog index
    pub built: AHashSet<usize>,
    /// Whether production was bought this turn
    pub did_buy: bool,
    /// Turn the city was founded (blocks same-turn buying)
    pub turn_founded: u32,
    /// Turns of civil disorder left; blocks buying units
    pub anarchy: u32,
}

impl City {
    pub fn new(owner: PlayerId, tile: usize, name: String, turn_founded: u32) -> Self {
        Self {
            id: CityId(0), // assigned by the arena on registration
            owner,
            tile,
            name,
            size: 1,
            food_stock: 0,
            shield_stock: 0,
            production: None,
            built: AHashSet::new(),
            did_buy: false,
            turn_founded,
            anarchy: 0,
        }
    }

    /// Food needed in the granary before the city grows
    pub fn granary_size(&self, ruleset: &Ruleset) -> u32 {
        (self.size + 1) * ruleset.rules.granary_food_per_size
    }

    /// Shield cost of the current production target, if any
    pub fn production_cost(&self, ruleset: &Ruleset) -> Option<u32> {
        match self.production? {
            ProductionTarget::Unit(idx) => ruleset.unit_types.get(idx).map(|u| u.cost),
            ProductionTarget::Building(idx) => ruleset.buildings.get(idx).map(|b| b.cost),
        }
    }

    /// Gold needed to buy out the remaining shields
    pub fn buy_cost(&self, ruleset: &Ruleset) -> Option<u32> {
        let cost = self.production_cost(ruleset)?;
        let remaining = cost.saturating_sub(self.shield_stock);
        Some(remaining * ruleset.rules.buy_gold_per_shield)
    }

    /// Estimated turns to finish production at the given shield surplus
    pub fn turns_to_complete(&self, ruleset: &Ruleset, surplus: u32) -> i32 {
        match self.production_cost(ruleset) {
            Some(cost) => {
                let remaining = cost.saturating_sub(self.shield_stock);
                if remaining == 0 {
                    1
                } else if surplus == 0 {
                    -1 // never at current output
                } else {
                    remaining.div_ceil(surplus) as i32
                }
            }
            None => -1,
        }
    }
}
