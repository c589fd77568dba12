//! Ruleset catalogs loaded from TOML

pub mod catalog;
mod loader;

pub use catalog::{BuildingDef, GameRules, Ruleset, TechDef, TerrainDef, UnitTypeDef};
