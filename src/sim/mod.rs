//! Rules-engine dynamics: movement, combat, commands, AI, turn flow

pub mod ai;
pub mod combat;
pub mod commands;
pub mod movement;
pub mod turn;
