//! Ruleset loading and validation
//!
//! Rulesets are TOML documents. The `classic` ruleset ships embedded in
//! the binary; loading by any other name fails. After parsing, every
//! by-name reference (tech prerequisites, unit/building tech gates, start
//! units) is resolved to a catalog index so the engine never does string
//! lookups at play time.

use crate::core::error::{GymError, Result};
use crate::rules::catalog::Ruleset;

/// The built-in ruleset, embedded so no data files are needed at runtime
const BUILTIN_CLASSIC: &str = include_str!("data/classic.toml");

impl Ruleset {
    /// Load a ruleset by name
    pub fn load(name: &str) -> Result<Ruleset> {
        match name {
            "classic" => Ruleset::from_toml_str(BUILTIN_CLASSIC),
            other => Err(GymError::Ruleset(format!("unknown ruleset: {}", other))),
        }
    }

    /// Parse and validate a ruleset from TOML text
    pub fn from_toml_str(text: &str) -> Result<Ruleset> {
        let mut ruleset: Ruleset = toml::from_str(text)?;
        ruleset.resolve()?;
        Ok(ruleset)
    }

    /// Resolve by-name references to indices and check cross-references
    fn resolve(&mut self) -> Result<()> {
        if self.nations.is_empty() {
            return Err(GymError::Ruleset("ruleset defines no nations".into()));
        }
        if self.colors.len() < self.nations.len() {
            return Err(GymError::Ruleset(format!(
                "{} nations but only {} colors",
                self.nations.len(),
                self.colors.len()
            )));
        }
        if !self
            .terrain
            .iter()
            .any(|t| !t.is_water && t.can_found_city)
        {
            return Err(GymError::Ruleset(
                "ruleset has no land terrain that accepts cities".into(),
            ));
        }

        let tech_index = |name: &str, techs: &[crate::rules::TechDef]| -> Result<usize> {
            techs
                .iter()
                .position(|t| t.name == name)
                .ok_or_else(|| GymError::Ruleset(format!("unknown technology: {}", name)))
        };

        // Tech prerequisites
        let tech_names: Vec<String> = self.techs.iter().map(|t| t.name.clone()).collect();
        for (i, tech) in self.techs.iter_mut().enumerate() {
            tech.requires_idx.clear();
            for req in &tech.requires {
                let idx = tech_names
                    .iter()
                    .position(|n| n == req)
                    .ok_or_else(|| GymError::Ruleset(format!("unknown technology: {}", req)))?;
                if idx == i {
                    return Err(GymError::Ruleset(format!(
                        "technology {} requires itself",
                        tech.name
                    )));
                }
                tech.requires_idx.push(idx);
            }
        }

        // Unit and building tech gates
        let techs = self.techs.clone();
        for unit in &mut self.unit_types {
            unit.requires_tech_idx = match &unit.requires_tech {
                Some(name) => Some(tech_index(name, &techs)?),
                None => None,
            };
        }
        for building in &mut self.buildings {
            building.requires_tech_idx = match &building.requires_tech {
                Some(name) => Some(tech_index(name, &techs)?),
                None => None,
            };
        }

        // Start units and initial techs must exist
        for name in &self.rules.start_units {
            if self.unit_type_by_name(name).is_none() {
                return Err(GymError::Ruleset(format!("unknown start unit: {}", name)));
            }
        }
        for name in &self.rules.initial_techs {
            tech_index(name, &techs)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_loads_and_resolves() {
        let ruleset = Ruleset::load("classic").unwrap();
        assert_eq!(ruleset.name, "classic");

        // Every resolved prerequisite points inside the catalog
        for tech in &ruleset.techs {
            assert_eq!(tech.requires.len(), tech.requires_idx.len());
            for &idx in &tech.requires_idx {
                assert!(idx < ruleset.techs.len());
            }
        }
        for unit in &ruleset.unit_types {
            if unit.requires_tech.is_some() {
                assert!(unit.requires_tech_idx.is_some());
            }
        }
    }

    #[test]
    fn test_unknown_ruleset_fails() {
        assert!(matches!(
            Ruleset::load("no_such_ruleset"),
            Err(GymError::Ruleset(_))
        ));
    }

    #[test]
    fn test_unknown_prerequisite_fails() {
        let text = r#"
name = "broken"
nations = ["Azure"]
colors = [[0, 0, 255]]
city_names = ["First"]
buildings = []

[rules]
initial_gold = 50
start_units = ["Scout"]
granary_food_per_size = 20
buy_gold_per_shield = 2
road_turns = 3
irrigation_turns = 5
mine_turns = 10
end_turn = 500
start_year = -4000
year_per_turn = 50
min_city_distance = 2
city_vision_radius = 2
land_percent = 30

[[terrain]]
name = "Steppe"
move_cost = 1
defense_bonus = 100
food = 2
shield = 0
trade = 1
can_found_city = true
fraction = 1.0

[[unit_types]]
name = "Scout"
cost = 10
attack = 1
defense = 1
hp = 10
moves = 1

[[techs]]
name = "Smelting"
cost = 10
requires = ["Alchemy"]
"#;
        assert!(matches!(
            Ruleset::from_toml_str(text),
            Err(GymError::Ruleset(_))
        ));
    }
}
