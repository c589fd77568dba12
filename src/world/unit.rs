//! Unit state and activities

use serde::{Deserialize, Serialize};

use crate::core::types::{PlayerId, UnitId};
use crate::rules::UnitTypeDef;

/// Movement fragments per movement point
///
/// Moves are tracked in fragments so a road step can cost less than a
/// full point. A unit with N movement points starts each turn with
/// `N * MOVE_FRAGS` fragments.
pub const MOVE_FRAGS: u32 = 3;

/// What a unit is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activity {
    Idle,
    /// Digging in; becomes `Fortified` at the next turn begin
    Fortifying,
    Fortified,
    BuildingRoad,
    BuildingIrrigation,
    BuildingMine,
}

impl Default for Activity {
    fn default() -> Self {
        Self::Idle
    }
}

/// One unit in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    /// Unit-type catalog index
    pub type_idx: usize,
    pub owner: PlayerId,
    /// Current tile index
    pub tile: usize,
    pub hp: u32,
    pub max_hp: u32,
    /// Remaining movement in fragments
    pub moves_left: u32,
    pub veteran: u32,
    pub activity: Activity,
    /// Turns of work left on the current terrain activity
    pub activity_turns_left: u32,
    pub vision: u32,
}

impl Unit {
    pub fn new(id: UnitId, type_idx: usize, owner: PlayerId, tile: usize, def: &UnitTypeDef) -> Self {
        Self {
            id,
            type_idx,
            owner,
            tile,
            hp: def.hp,
            max_hp: def.hp,
            moves_left: def.moves * MOVE_FRAGS,
            veteran: 0,
            activity: Activity::Idle,
            activity_turns_left: 0,
            vision: def.vision,
        }
    }

    pub fn is_fortified(&self) -> bool {
        self.activity == Activity::Fortified
    }

    /// Cancel any activity in progress (movement breaks work)
    pub fn cancel_activity(&mut self) {
        self.activity = Activity::Idle;
        self.activity_turns_left = 0;
    }
}
