//! Player state: economy, research, per-player entity lists

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::core::types::{CityId, PlayerId, UnitId};
use crate::rules::Ruleset;

/// Tax/science/luxury split and treasury
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Economy {
    pub gold: i32,
    /// Percent of trade converted to gold
    pub tax_rate: u32,
    /// Percent of trade converted to research bulbs
    pub science_rate: u32,
    /// Percent of trade converted to luxury
    pub luxury_rate: u32,
}

impl Default for Economy {
    fn default() -> Self {
        // Standard opening split: half taxes, half science
        Self {
            gold: 0,
            tax_rate: 50,
            science_rate: 50,
            luxury_rate: 0,
        }
    }
}

/// Research progress for one player
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Research {
    /// Tech currently being researched, by catalog index
    pub current: Option<usize>,
    /// Bulbs accumulated toward `current`
    pub bulbs: u32,
    /// Techs already known, by catalog index
    pub known: AHashSet<usize>,
}

impl Research {
    /// Whether all prerequisites of `tech_idx` are known but the tech is not
    pub fn can_research(&self, ruleset: &Ruleset, tech_idx: usize) -> bool {
        let Some(tech) = ruleset.techs.get(tech_idx) else {
            return false;
        };
        if self.known.contains(&tech_idx) {
            return false;
        }
        tech.requires_idx.iter().all(|req| self.known.contains(req))
    }
}

/// One player in the roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Nation name, also used for display
    pub nation: String,
    pub color: [u8; 3],
    pub is_alive: bool,
    pub is_ai: bool,
    /// AI difficulty 0-10; unused for the controlled player
    pub skill: u32,
    pub economy: Economy,
    pub research: Research,
    /// Set when the player has finished acting this phase
    pub phase_done: bool,
    pub score: i32,
    /// Owned units in creation order (deterministic iteration)
    pub units: Vec<UnitId>,
    /// Owned cities in creation order
    pub cities: Vec<CityId>,
}

impl Player {
    pub fn new(id: PlayerId, nation: String, color: [u8; 3], is_ai: bool, skill: u32) -> Self {
        Self {
            id,
            nation,
            color,
            is_alive: true,
            is_ai,
            skill,
            economy: Economy::default(),
            research: Research::default(),
            phase_done: false,
            score: 0,
            units: Vec::new(),
            cities: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_research_requires_prereqs() {
        let ruleset = Ruleset::load("classic").unwrap();
        let alphabet = ruleset.tech_by_name("Alphabet").unwrap();
        let writing = ruleset.tech_by_name("Writing").unwrap();

        let mut research = Research::default();
        assert!(research.can_research(&ruleset, alphabet));
        assert!(!research.can_research(&ruleset, writing));

        research.known.insert(alphabet);
        assert!(research.can_research(&ruleset, writing));
        assert!(!research.can_research(&ruleset, alphabet));
    }
}
