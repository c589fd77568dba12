//! The RL environment layer
//!
//! Everything a caller touches lives here: the session state machine,
//! observations, legal-action masks, the action dispatcher, and the flat
//! action-space encoding. The layer talks to the rules engine only
//! through its public API.

pub mod action;
pub mod advance;
pub mod encoding;
pub mod observation;
pub mod session;
pub mod step;
pub mod valid_actions;

pub use action::{Action, StepResult};
pub use encoding::{ActionTable, MAX_LEGAL_ACTIONS};
pub use observation::{CityObs, Observation, PlayerObs, TileObs, UnitObs};
pub use session::{Session, SessionState};
pub use valid_actions::{CityActionMask, UnitActionMask, ValidActions};
