//! Actions and step results
//!
//! [`Action`] is the closed set of requests an agent can submit. The
//! dispatcher matches it exhaustively, so adding a variant without
//! handling it everywhere is a compile error, not a silently dropped
//! request. [`Action::from_raw`] decodes the flat integer record used at
//! the wire boundary; unknown type codes are rejected there and never
//! reach the dispatcher.

use serde::{Deserialize, Serialize};

use crate::core::error::{GymError, Result};
use crate::core::types::{CityId, Direction, UnitId};

/// One discrete request from the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Move (or attack, or capture; the engine decides) one step
    UnitMove { unit: UnitId, dir: Direction },
    /// Attack the stack on a specific tile
    UnitAttack { unit: UnitId, target_tile: usize },
    UnitFortify { unit: UnitId },
    /// Found a city at the unit's own tile
    UnitBuildCity { unit: UnitId },
    UnitBuildRoad { unit: UnitId },
    UnitBuildIrrigation { unit: UnitId },
    UnitBuildMine { unit: UnitId },
    UnitDisband { unit: UnitId },
    /// Change city production; `is_building` selects the catalog
    CityBuild {
        city: CityId,
        target: usize,
        is_building: bool,
    },
    /// Buy out the city's current production
    CityBuy { city: CityId },
    /// Set the controlled player's research target
    ResearchSet { tech: usize },
    /// Finish the phase and advance the game
    EndTurn,
    Noop,
}

/// Wire type codes, in enumeration order
const CODE_UNIT_MOVE: i32 = 0;
const CODE_UNIT_ATTACK: i32 = 1;
const CODE_UNIT_FORTIFY: i32 = 2;
const CODE_UNIT_BUILD_CITY: i32 = 3;
const CODE_UNIT_BUILD_ROAD: i32 = 4;
const CODE_UNIT_BUILD_IRRIGATION: i32 = 5;
const CODE_UNIT_BUILD_MINE: i32 = 6;
const CODE_UNIT_DISBAND: i32 = 7;
const CODE_CITY_BUILD: i32 = 8;
const CODE_CITY_BUY: i32 = 9;
const CODE_RESEARCH_SET: i32 = 10;
const CODE_END_TURN: i32 = 11;
const CODE_NOOP: i32 = 12;

impl Action {
    /// Decode the flat `{type, actor, target, sub_target}` wire record
    ///
    /// Direction values for moves use the 8-way compass encoding in
    /// `sub_target`; for production changes `sub_target` selects
    /// unit (0) vs building (nonzero).
    pub fn from_raw(type_code: i32, actor: i32, target: i32, sub_target: i32) -> Result<Action> {
        let unit = || UnitId(actor.max(0) as u32);
        let city = || CityId(actor.max(0) as u32);

        match type_code {
            CODE_UNIT_MOVE => {
                let dir = Direction::from_index(sub_target.max(0) as usize)
                    .ok_or(GymError::UnknownActionType(type_code))?;
                Ok(Action::UnitMove { unit: unit(), dir })
            }
            CODE_UNIT_ATTACK => Ok(Action::UnitAttack {
                unit: unit(),
                target_tile: target.max(0) as usize,
            }),
            CODE_UNIT_FORTIFY => Ok(Action::UnitFortify { unit: unit() }),
            CODE_UNIT_BUILD_CITY => Ok(Action::UnitBuildCity { unit: unit() }),
            CODE_UNIT_BUILD_ROAD => Ok(Action::UnitBuildRoad { unit: unit() }),
            CODE_UNIT_BUILD_IRRIGATION => Ok(Action::UnitBuildIrrigation { unit: unit() }),
            CODE_UNIT_BUILD_MINE => Ok(Action::UnitBuildMine { unit: unit() }),
            CODE_UNIT_DISBAND => Ok(Action::UnitDisband { unit: unit() }),
            CODE_CITY_BUILD => Ok(Action::CityBuild {
                city: city(),
                target: target.max(0) as usize,
                is_building: sub_target != 0,
            }),
            CODE_CITY_BUY => Ok(Action::CityBuy { city: city() }),
            CODE_RESEARCH_SET => Ok(Action::ResearchSet {
                tech: target.max(0) as usize,
            }),
            CODE_END_TURN => Ok(Action::EndTurn),
            CODE_NOOP => Ok(Action::Noop),
            other => Err(GymError::UnknownActionType(other)),
        }
    }
}

/// Outcome of one `step` call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResult {
    /// +1 controlled player won, -1 someone else won, 0 otherwise
    pub reward: f32,
    /// Episode terminated
    pub done: bool,
    /// Episode truncated (reserved)
    pub truncated: bool,
    /// Diagnostic for ignored or notable requests
    pub info: Option<String>,
}

impl StepResult {
    /// Zero-effect result carrying a diagnostic
    pub fn ignored(info: impl Into<String>) -> Self {
        Self {
            info: Some(info.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_move() {
        let action = Action::from_raw(CODE_UNIT_MOVE, 7, 0, 3).unwrap();
        assert_eq!(
            action,
            Action::UnitMove {
                unit: UnitId(7),
                dir: Direction::Southeast
            }
        );
    }

    #[test]
    fn test_from_raw_city_build_sub_target() {
        let unit = Action::from_raw(CODE_CITY_BUILD, 2, 4, 0).unwrap();
        assert_eq!(
            unit,
            Action::CityBuild {
                city: CityId(2),
                target: 4,
                is_building: false
            }
        );
        let building = Action::from_raw(CODE_CITY_BUILD, 2, 4, 1).unwrap();
        assert_eq!(
            building,
            Action::CityBuild {
                city: CityId(2),
                target: 4,
                is_building: true
            }
        );
    }

    #[test]
    fn test_from_raw_rejects_unknown_code() {
        assert!(matches!(
            Action::from_raw(99, 0, 0, 0),
            Err(GymError::UnknownActionType(99))
        ));
        assert!(matches!(
            Action::from_raw(-1, 0, 0, 0),
            Err(GymError::UnknownActionType(-1))
        ));
    }

    #[test]
    fn test_from_raw_rejects_bad_direction() {
        assert!(Action::from_raw(CODE_UNIT_MOVE, 1, 0, 8).is_err());
    }
}
