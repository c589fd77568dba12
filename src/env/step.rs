//! Action dispatch
//!
//! `step` is a pure mapping from action variant to one engine operation.
//! Anything invalid — no running game, nonexistent actor, actor not
//! owned by the controlled player — is silently ignored: the request
//! mutates nothing and the result carries a diagnostic. Only `EndTurn`
//! advances the game; every other action returns immediately with zero
//! reward and the turn still open.

use crate::core::types::{CityId, UnitId};
use crate::env::action::{Action, StepResult};
use crate::env::advance;
use crate::env::session::Session;
use crate::sim::commands::{self, TerrainActivity};
use crate::sim::{combat, movement};
use crate::world::city::ProductionTarget;
use crate::world::GameWorld;

impl Session {
    /// Execute one action and return the result
    pub fn step(&mut self, action: &Action) -> StepResult {
        let controlled = self.controlled_player_id();
        let Some(world) = self.running_world_mut() else {
            return StepResult::ignored("game not running");
        };
        if world.player(controlled).is_none() {
            return StepResult::ignored("controlled player not found");
        }

        match *action {
            Action::UnitMove { unit, dir } => {
                let Some(tile) = owned_unit_tile(world, unit, controlled) else {
                    return foreign_actor();
                };
                if let Some(dst) = world.map.step(tile, dir) {
                    // Engine decides attack vs move vs capture at dst
                    movement::move_or_attack(world, unit, dst);
                }
                StepResult::default()
            }

            Action::UnitAttack { unit, target_tile } => {
                let Some(tile) = owned_unit_tile(world, unit, controlled) else {
                    return foreign_actor();
                };
                let attack = world
                    .unit(unit)
                    .map(|u| world.ruleset.unit_types[u.type_idx].attack)
                    .unwrap_or(0);
                let enabled = attack > 0
                    && target_tile < world.map.num_tiles()
                    && world.map.distance(tile, target_tile) == 1
                    && movement::attackable_tile(world, target_tile, controlled);
                if enabled {
                    combat::resolve_attack(world, unit, target_tile);
                }
                StepResult::default()
            }

            Action::UnitFortify { unit } => {
                if owned_unit_tile(world, unit, controlled).is_none() {
                    return foreign_actor();
                }
                commands::fortify(world, unit);
                StepResult::default()
            }

            Action::UnitBuildCity { unit } => {
                if owned_unit_tile(world, unit, controlled).is_none() {
                    return foreign_actor();
                }
                commands::found_city(world, unit);
                StepResult::default()
            }

            Action::UnitBuildRoad { unit } => {
                if owned_unit_tile(world, unit, controlled).is_none() {
                    return foreign_actor();
                }
                commands::start_activity(world, unit, TerrainActivity::Road);
                StepResult::default()
            }

            Action::UnitBuildIrrigation { unit } => {
                if owned_unit_tile(world, unit, controlled).is_none() {
                    return foreign_actor();
                }
                commands::start_activity(world, unit, TerrainActivity::Irrigation);
                StepResult::default()
            }

            Action::UnitBuildMine { unit } => {
                if owned_unit_tile(world, unit, controlled).is_none() {
                    return foreign_actor();
                }
                commands::start_activity(world, unit, TerrainActivity::Mine);
                StepResult::default()
            }

            Action::UnitDisband { unit } => {
                if owned_unit_tile(world, unit, controlled).is_none() {
                    return foreign_actor();
                }
                commands::disband(world, unit);
                StepResult::default()
            }

            Action::CityBuild {
                city,
                target,
                is_building,
            } => {
                if !owned_city(world, city, controlled) {
                    return foreign_actor();
                }
                let production = if is_building {
                    ProductionTarget::Building(target)
                } else {
                    ProductionTarget::Unit(target)
                };
                commands::set_production(world, city, production);
                StepResult::default()
            }

            Action::CityBuy { city } => {
                if !owned_city(world, city, controlled) {
                    return foreign_actor();
                }
                // Engine enforces the full eligibility conjunction
                commands::buy(world, city);
                StepResult::default()
            }

            Action::ResearchSet { tech } => {
                commands::set_research(world, controlled, tech);
                StepResult::default()
            }

            Action::EndTurn => advance::end_turn(world, controlled),

            Action::Noop => StepResult::default(),
        }
    }
}

fn foreign_actor() -> StepResult {
    StepResult::ignored("actor not owned by controlled player")
}

fn owned_unit_tile(
    world: &GameWorld,
    unit_id: UnitId,
    controlled: crate::core::types::PlayerId,
) -> Option<usize> {
    let unit = world.unit(unit_id)?;
    if unit.owner == controlled {
        Some(unit.tile)
    } else {
        None
    }
}

fn owned_city(
    world: &GameWorld,
    city_id: CityId,
    controlled: crate::core::types::PlayerId,
) -> bool {
    world
        .city(city_id)
        .map(|c| c.owner == controlled)
        .unwrap_or(false)
}
