//! Session lifecycle
//!
//! A [`Session`] owns one game and is the only entry point callers use.
//! Exactly one session may be live per process: the world graph is a
//! single mutable state and nothing here is synchronized. The constraint
//! is enforced by a process-wide slot claimed in [`Session::new`] and
//! released when the session drops, so a second live session is a
//! constructor error instead of silent aliasing.

use std::sync::atomic::{AtomicBool, Ordering};

use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::core::config::GameConfig;
use crate::core::error::{GymError, Result};
use crate::core::types::PlayerId;
use crate::env::observation::{self, Observation};
use crate::env::valid_actions::{self, ValidActions};
use crate::rules::Ruleset;
use crate::sim::turn;
use crate::world::city::City;
use crate::world::map::Tile;
use crate::world::player::Player;
use crate::world::unit::Unit;
use crate::world::visibility::PlayerVision;
use crate::world::{mapgen, GameWorld, Settings};

/// The one-session-per-process slot
static SESSION_SLOT: AtomicBool = AtomicBool::new(false);

/// Lifecycle state of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Shut down; only dropping the session is meaningful
    Uninitialized,
    /// Ready to start a game
    Initialized,
    /// A game is running
    GameRunning,
}

/// One RL environment session
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    world: Option<GameWorld>,
    controlled: PlayerId,
}

impl Session {
    /// Claim the process session slot and prepare core subsystems
    ///
    /// Fails with [`GymError::SessionActive`] while another session is
    /// live anywhere in the process.
    pub fn new() -> Result<Session> {
        if SESSION_SLOT
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(GymError::SessionActive);
        }
        tracing::debug!("session initialized");
        Ok(Session {
            state: SessionState::Initialized,
            world: None,
            controlled: PlayerId(0),
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SessionState::GameRunning
    }

    /// Start a new game from `config`
    ///
    /// If a game is already running it is fully torn down first: this is
    /// a destructive reset, not a resume. A failed attempt leaves the
    /// session in its prior (non-running) state with no partial world.
    pub fn new_game(&mut self, config: &GameConfig) -> Result<()> {
        if self.state == SessionState::Uninitialized {
            return Err(GymError::NotInitialized);
        }

        if self.world.take().is_some() {
            tracing::debug!("tearing down running game for new_game");
            self.state = SessionState::Initialized;
        }

        config.validate().map_err(GymError::InvalidConfig)?;

        // Everything below builds into a local world; the session is
        // only touched once the whole setup has succeeded.
        let ruleset = Ruleset::load(&config.ruleset)?;
        let seed = if config.seed == 0 {
            rand::random::<u32>().max(1)
        } else {
            config.seed
        };
        let settings = Settings {
            fog_of_war: config.fog_of_war,
            seed,
            end_turn: ruleset.rules.end_turn,
        };

        let num_players = (1 + config.num_ai_players) as usize;
        let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed));

        let (map, start_positions) = mapgen::generate(
            config.map_width,
            config.map_height,
            num_players,
            &ruleset,
            &mut rng,
        )?;

        let mut world = GameWorld::new(ruleset, settings, map, rng);
        let controlled = create_players(&mut world, config)?;
        place_starting_units(&mut world, &start_positions);
        grant_initial_state(&mut world);

        // Pregame turn 0 -> running turn 1
        world.turn = 1;
        turn::begin_turn(&mut world, true);

        tracing::info!(
            "new game: {} {}x{}, {} players, seed {}",
            config.ruleset,
            config.map_width,
            config.map_height,
            num_players,
            seed
        );

        self.world = Some(world);
        self.controlled = controlled;
        self.state = SessionState::GameRunning;
        Ok(())
    }

    /// Fast re-initialization to the same configuration
    ///
    /// Not implemented; callers fall back to [`Session::new_game`].
    pub fn reset(&mut self) -> Result<()> {
        Err(GymError::ResetUnsupported)
    }

    /// Tear down any running game and leave the session unusable
    ///
    /// Idempotent. The process slot is released when the session drops.
    pub fn shutdown(&mut self) {
        if self.world.take().is_some() {
            tracing::debug!("game state freed on shutdown");
        }
        self.state = SessionState::Uninitialized;
    }

    /// Snapshot the current game into `obs`
    ///
    /// No-op (cleared observation) unless a game is running and the
    /// controlled player resolves.
    pub fn observe(&self, obs: &mut Observation) {
        let Some(world) = self.running_world() else {
            obs.clear();
            return;
        };
        if world.player(self.controlled).is_none() {
            obs.clear();
            return;
        }
        observation::build(world, self.controlled, obs);
    }

    /// Compute the legal-action mask for the controlled player
    ///
    /// Freshly allocated on every call; empty when no game is running.
    pub fn valid_actions(&self) -> ValidActions {
        match self.running_world() {
            Some(world) => valid_actions::enumerate(world, self.controlled),
            None => ValidActions::default(),
        }
    }

    pub fn controlled_player_id(&self) -> PlayerId {
        self.controlled
    }

    // --- Catalog introspection (for action-space sizing) ---

    pub fn num_unit_types(&self) -> usize {
        self.running_world().map_or(0, |w| w.ruleset.num_unit_types())
    }

    pub fn num_building_types(&self) -> usize {
        self.running_world().map_or(0, |w| w.ruleset.num_buildings())
    }

    pub fn num_techs(&self) -> usize {
        self.running_world().map_or(0, |w| w.ruleset.num_techs())
    }

    pub fn unit_type_name(&self, index: usize) -> Option<&str> {
        self.running_world().and_then(|w| w.ruleset.unit_type_name(index))
    }

    pub fn building_type_name(&self, index: usize) -> Option<&str> {
        self.running_world().and_then(|w| w.ruleset.building_name(index))
    }

    pub fn tech_name(&self, index: usize) -> Option<&str> {
        self.running_world().and_then(|w| w.ruleset.tech_name(index))
    }

    // --- Low-level access (debugging / advanced use) ---

    pub fn controlled_player(&self) -> Option<&Player> {
        self.running_world().and_then(|w| w.player(self.controlled))
    }

    pub fn unit(&self, id: crate::core::types::UnitId) -> Option<&Unit> {
        self.running_world().and_then(|w| w.unit(id))
    }

    pub fn city(&self, id: crate::core::types::CityId) -> Option<&City> {
        self.running_world().and_then(|w| w.city(id))
    }

    pub fn tile(&self, x: u32, y: u32) -> Option<&Tile> {
        self.running_world().and_then(|w| w.map.tile_at(x, y))
    }

    pub(crate) fn running_world(&self) -> Option<&GameWorld> {
        if self.state == SessionState::GameRunning {
            self.world.as_ref()
        } else {
            None
        }
    }

    pub(crate) fn running_world_mut(&mut self) -> Option<&mut GameWorld> {
        if self.state == SessionState::GameRunning {
            self.world.as_mut()
        } else {
            None
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.world = None;
        SESSION_SLOT.store(false, Ordering::SeqCst);
    }
}

/// Create the controlled player plus the configured AI roster
///
/// Nations and colors are assigned in a shuffled pick order; every
/// player gets a distinct nation.
fn create_players(world: &mut GameWorld, config: &GameConfig) -> Result<PlayerId> {
    use rand::seq::SliceRandom;

    let num_players = (1 + config.num_ai_players) as usize;
    if world.ruleset.nations.len() < num_players {
        return Err(GymError::PlayerCreation(format!(
            "ruleset has {} nations for {} players",
            world.ruleset.nations.len(),
            num_players
        )));
    }

    let mut nation_order: Vec<usize> = (0..world.ruleset.nations.len()).collect();
    nation_order.shuffle(&mut world.rng);

    for i in 0..num_players {
        let nation_idx = nation_order[i];
        let nation = world.ruleset.nations[nation_idx].clone();
        let color = world.ruleset.colors[nation_idx];
        let is_ai = i > 0;
        let skill = if is_ai { config.ai_skill_level } else { 0 };
        world
            .players
            .push(Player::new(PlayerId(i as u32), nation, color, is_ai, skill));
        world.vision.push(PlayerVision::new(
            world.map.num_tiles(),
            !config.fog_of_war,
        ));
    }

    // The controlled player is created first and keeps index 0
    Ok(PlayerId(0))
}

/// Give every player their ruleset start units at their start position
fn place_starting_units(world: &mut GameWorld, start_positions: &[usize]) {
    let start_units: Vec<usize> = world
        .ruleset
        .rules
        .start_units
        .iter()
        .map(|name| {
            world
                .ruleset
                .unit_type_by_name(name)
                .expect("validated at ruleset load")
        })
        .collect();

    for (i, &tile) in start_positions.iter().enumerate() {
        for &type_idx in &start_units {
            world.spawn_unit(PlayerId(i as u32), type_idx, tile);
        }
    }
}

/// Starting techs and treasury per the ruleset
fn grant_initial_state(world: &mut GameWorld) {
    let initial_gold = world.ruleset.rules.initial_gold;
    let initial_techs: Vec<usize> = world
        .ruleset
        .rules
        .initial_techs
        .iter()
        .map(|name| {
            world
                .ruleset
                .tech_by_name(name)
                .expect("validated at ruleset load")
        })
        .collect();

    for player in &mut world.players {
        player.economy.gold = initial_gold;
        for &tech in &initial_techs {
            player.research.known.insert(tech);
        }
    }
}
