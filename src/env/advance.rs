//! Turn/phase controller
//!
//! Drives the end-turn sequence: the controlled player's phase closes,
//! every living AI player runs its phase through the engine's AI hook,
//! end-of-phase upkeep runs for every living player, and the next turn
//! begins through the engine's standard turn-begin sequence. Phases
//! strictly alternate, so one advance is exactly one full round through
//! all players before control returns to the caller.

use crate::core::types::PlayerId;
use crate::env::action::StepResult;
use crate::sim::{ai, turn};
use crate::world::GameWorld;

/// Process END_TURN: AI phases, upkeep, turn advance, termination
pub(crate) fn end_turn(world: &mut GameWorld, controlled: PlayerId) -> StepResult {
    world.players[controlled.index()].phase_done = true;

    // AI phases, in strict roster order
    for i in 0..world.players.len() {
        let id = PlayerId(i as u32);
        let p = &world.players[i];
        if p.is_ai && p.is_alive && !p.phase_done {
            world.phase = i as u32;
            ai::run_phase(world, id);
        }
    }

    // Simplified end-of-phase upkeep for every living player
    for i in 0..world.players.len() {
        let id = PlayerId(i as u32);
        if world.players[i].is_alive {
            turn::update_city_activities(world, id);
        }
    }

    // Next turn
    world.turn += 1;
    turn::begin_turn(world, false);
    tracing::debug!("advanced to turn {}", world.turn);

    let mut result = StepResult::default();
    let (game_over, winner) = check_game_over(world);
    if game_over {
        result.done = true;
        if winner == controlled.index() as i32 {
            result.reward = 1.0;
        } else if winner >= 0 {
            result.reward = -1.0;
        }
        tracing::info!("game over at turn {}, winner {}", world.turn, winner);
    }
    result
}

/// Termination check: domination, then turn limit
///
/// Returns `(game_over, winner_index)`; winner is -1 for a no-winner
/// termination.
pub(crate) fn check_game_over(world: &GameWorld) -> (bool, i32) {
    // Domination: exactly one player left standing
    let mut alive = 0;
    let mut last_alive = -1;
    for player in &world.players {
        if player.is_alive {
            alive += 1;
            last_alive = player.id.index() as i32;
        }
    }
    if alive == 1 {
        return (true, last_alive);
    }

    // Turn limit: highest score wins, first maximal on ties
    if world.turn >= world.settings.end_turn {
        let mut best_score = -1;
        let mut winner = -1;
        for player in &world.players {
            if player.is_alive && player.score > best_score {
                best_score = player.score;
                winner = player.id.index() as i32;
            }
        }
        return (true, winner);
    }

    (false, -1)
}
