//! Headless playtest driver
//!
//! Starts a game and plays random legal actions for a fixed number of
//! turns, printing a per-turn summary. Exists to exercise the public API
//! end to end; the policy is deliberately dumb.

use civgym::core::config::GameConfig;
use civgym::env::{Action, ActionTable, Observation, Session};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Headless playtest - random rollouts against the AI
#[derive(Parser, Debug)]
#[command(name = "playtest")]
#[command(about = "Play random legal actions against the AI and print a summary")]
struct Args {
    /// Map width in tiles
    #[arg(long, default_value_t = 40)]
    map_width: u32,

    /// Map height in tiles
    #[arg(long, default_value_t = 40)]
    map_height: u32,

    /// Number of AI opponents
    #[arg(long, default_value_t = 2)]
    ai_players: u32,

    /// AI skill level (0-10)
    #[arg(long, default_value_t = 3)]
    ai_skill: u32,

    /// Game seed (0 = random)
    #[arg(long, default_value_t = 12345)]
    seed: u32,

    /// Seed for the random policy
    #[arg(long, default_value_t = 1)]
    policy_seed: u64,

    /// Turns to play before stopping
    #[arg(long, default_value_t = 20)]
    turns: u32,

    /// Disable fog of war
    #[arg(long)]
    no_fog: bool,

    /// Print the final observation as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> civgym::core::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "civgym=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = GameConfig {
        map_width: args.map_width,
        map_height: args.map_height,
        num_ai_players: args.ai_players,
        ai_skill_level: args.ai_skill,
        seed: args.seed,
        fog_of_war: !args.no_fog,
        ..GameConfig::default()
    };

    let mut session = Session::new()?;
    session.new_game(&config)?;

    let mut policy_rng = StdRng::seed_from_u64(args.policy_seed);
    let mut obs = Observation::new();

    loop {
        session.observe(&mut obs);
        if obs.turn > args.turns || obs.game_over {
            break;
        }

        let me = &obs.players[obs.controlled_player as usize];
        println!(
            "turn {:>3}  year {:>5}  gold {:>4}  units {:>2}  cities {:>2}  score {:>3}",
            obs.turn, obs.year, me.gold, me.num_units, me.num_cities, me.score
        );

        // Play random legal actions until the turn advances
        let mut acted = 0;
        loop {
            let valid = session.valid_actions();
            let table = ActionTable::build(&valid);
            if table.is_empty() {
                break;
            }

            // Bias toward ending the turn so rollouts terminate
            let action = if acted > 12 || policy_rng.gen_bool(0.2) {
                Action::EndTurn
            } else {
                table.decode(policy_rng.gen_range(0..table.len()))
            };
            let is_end_turn = action == Action::EndTurn;

            let result = session.step(&action);
            if let Some(info) = &result.info {
                tracing::debug!("step ignored: {}", info);
            }
            if result.done {
                session.observe(&mut obs);
                println!(
                    "game over at turn {}: winner {} reward {}",
                    obs.turn, obs.winner, result.reward
                );
                break;
            }
            if is_end_turn {
                break;
            }
            acted += 1;
        }
    }

    if args.json {
        session.observe(&mut obs);
        println!("{}", serde_json::to_string_pretty(&obs)?);
    }

    session.shutdown();
    Ok(())
}
