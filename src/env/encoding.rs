//! Flat action-space encoding
//!
//! RL agents sample from a bounded discrete space, not from structured
//! masks. An [`ActionTable`] lays every legal action out in a stable
//! order so an index picked by a policy decodes straight to an
//! [`Action`]. Slots are assigned by sorting the controlled player's
//! own entity ids, so enemy units appearing or disappearing never shifts
//! the layout. Decoding an out-of-range index yields `Noop`.

use crate::env::action::Action;
use crate::env::valid_actions::ValidActions;

/// Cap on legal actions encoded per step
pub const MAX_LEGAL_ACTIONS: usize = 1024;

/// All legal actions for one step, in flat index order
#[derive(Debug, Clone, Default)]
pub struct ActionTable {
    entries: Vec<Action>,
}

impl ActionTable {
    /// Lay out `valid` into a flat table
    ///
    /// Order: end-turn, then per unit (ids ascending) moves in direction
    /// order / attacks / fortify / found-city / road / irrigation /
    /// mine / disband, then per city (ids ascending) buildable units /
    /// buildable buildings / buy, then research targets. Entries beyond
    /// the cap are dropped.
    pub fn build(valid: &ValidActions) -> ActionTable {
        let mut entries = Vec::new();

        if valid.can_end_turn {
            entries.push(Action::EndTurn);
        }

        let mut units: Vec<_> = valid.units.iter().collect();
        units.sort_by_key(|u| u.unit_id);
        for mask in units {
            let unit = mask.unit_id;
            for (d, &can) in mask.can_move.iter().enumerate() {
                if can {
                    let dir = crate::core::types::Direction::from_index(d)
                        .expect("mask is 8 wide");
                    entries.push(Action::UnitMove { unit, dir });
                }
            }
            for &target_tile in &mask.attackable_tiles {
                entries.push(Action::UnitAttack { unit, target_tile });
            }
            if mask.can_fortify {
                entries.push(Action::UnitFortify { unit });
            }
            if mask.can_build_city {
                entries.push(Action::UnitBuildCity { unit });
            }
            if mask.can_build_road {
                entries.push(Action::UnitBuildRoad { unit });
            }
            if mask.can_build_irrigation {
                entries.push(Action::UnitBuildIrrigation { unit });
            }
            if mask.can_build_mine {
                entries.push(Action::UnitBuildMine { unit });
            }
            if mask.can_disband {
                entries.push(Action::UnitDisband { unit });
            }
        }

        let mut cities: Vec<_> = valid.cities.iter().collect();
        cities.sort_by_key(|c| c.city_id);
        for mask in cities {
            let city = mask.city_id;
            for &target in &mask.buildable_units {
                entries.push(Action::CityBuild {
                    city,
                    target,
                    is_building: false,
                });
            }
            for &target in &mask.buildable_buildings {
                entries.push(Action::CityBuild {
                    city,
                    target,
                    is_building: true,
                });
            }
            if mask.can_buy {
                entries.push(Action::CityBuy { city });
            }
        }

        for &tech in &valid.researchable_techs {
            entries.push(Action::ResearchSet { tech });
        }

        if entries.len() > MAX_LEGAL_ACTIONS {
            tracing::debug!(
                "legal action table truncated from {} to {}",
                entries.len(),
                MAX_LEGAL_ACTIONS
            );
            entries.truncate(MAX_LEGAL_ACTIONS);
        }

        ActionTable { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn actions(&self) -> &[Action] {
        &self.entries
    }

    /// Decode a sampled index; out of range means do nothing
    pub fn decode(&self, index: usize) -> Action {
        self.entries.get(index).copied().unwrap_or(Action::Noop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CityId, UnitId};
    use crate::env::valid_actions::{CityActionMask, UnitActionMask};

    #[test]
    fn test_end_turn_is_first_entry() {
        let valid = ValidActions {
            can_end_turn: true,
            ..ValidActions::default()
        };
        let table = ActionTable::build(&valid);
        assert_eq!(table.decode(0), Action::EndTurn);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_out_of_range_decodes_to_noop() {
        let table = ActionTable::build(&ValidActions::default());
        assert_eq!(table.decode(500), Action::Noop);
    }

    #[test]
    fn test_unit_order_is_id_sorted() {
        let mut valid = ValidActions {
            can_end_turn: true,
            ..ValidActions::default()
        };
        // Insert out of id order; the table must sort
        for id in [9u32, 2, 5] {
            let mut mask = UnitActionMask {
                unit_id: UnitId(id),
                ..UnitActionMask::default()
            };
            mask.can_disband = true;
            valid.units.push(mask);
        }
        let table = ActionTable::build(&valid);
        assert_eq!(
            table.actions()[1..],
            [
                Action::UnitDisband { unit: UnitId(2) },
                Action::UnitDisband { unit: UnitId(5) },
                Action::UnitDisband { unit: UnitId(9) },
            ]
        );
    }

    #[test]
    fn test_city_entries_cover_both_catalogs() {
        let mut valid = ValidActions {
            can_end_turn: false,
            ..ValidActions::default()
        };
        valid.cities.push(CityActionMask {
            city_id: CityId(4),
            buildable_units: vec![0, 2],
            buildable_buildings: vec![1],
            can_buy: true,
        });
        let table = ActionTable::build(&valid);
        assert_eq!(table.len(), 4);
        assert_eq!(
            table.decode(2),
            Action::CityBuild {
                city: CityId(4),
                target: 1,
                is_building: true
            }
        );
        assert_eq!(table.decode(3), Action::CityBuy { city: CityId(4) });
    }
}
