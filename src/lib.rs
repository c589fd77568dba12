//! Civgym - Synchronous RL environment for a turn-based strategy game
//!
//! The crate is split into two layers. The rules engine (`rules`, `world`,
//! `sim`) implements a compact empire-building game: rulesets, map
//! generation, units, cities, combat, research, and AI players. The
//! environment layer (`env`) wraps the engine as a synchronous
//! reinforcement-learning environment: a caller starts a [`env::Session`],
//! pulls observations and legal-action masks, submits one discrete action
//! at a time, and receives a reward when the episode terminates.

pub mod core;
pub mod env;
pub mod rules;
pub mod sim;
pub mod world;
