//! Determinism guarantees
//!
//! The same nonzero seed must produce the same game: map, starts, unit
//! placement, the lot. The session half runs under the shared session
//! lock; the mapgen half exercises the generator directly over many
//! seeds with proptest.

use std::sync::{Mutex, MutexGuard, OnceLock};

use civgym::core::config::GameConfig;
use civgym::env::{Action, Observation, Session};
use civgym::rules::Ruleset;
use civgym::world::mapgen;
use proptest::prelude::*;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn session_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn config_with_seed(seed: u32) -> GameConfig {
    GameConfig {
        map_width: 40,
        map_height: 40,
        num_ai_players: 2,
        ai_skill_level: 3,
        seed,
        fog_of_war: true,
        ..GameConfig::default()
    }
}

fn initial_observation(seed: u32) -> Observation {
    let mut session = Session::new().expect("slot free under lock");
    session.new_game(&config_with_seed(seed)).unwrap();
    let mut obs = Observation::new();
    session.observe(&mut obs);
    obs
}

#[test]
fn test_same_seed_same_initial_observation() {
    let _guard = session_lock();
    let first = initial_observation(12345);
    let second = initial_observation(12345);

    assert_eq!(first.tiles, second.tiles);
    assert_eq!(first.units, second.units);
    assert_eq!(first.cities, second.cities);
    assert_eq!(first.players, second.players);
    assert_eq!(first.turn, second.turn);
}

#[test]
fn test_different_seeds_differ() {
    let _guard = session_lock();
    let first = initial_observation(1);
    let second = initial_observation(2);
    assert_ne!(first.tiles, second.tiles);
}

#[test]
fn test_same_seed_same_rollout() {
    let _guard = session_lock();

    let run = |seed: u32| {
        let mut session = Session::new().unwrap();
        session.new_game(&config_with_seed(seed)).unwrap();
        let mut obs = Observation::new();
        for _ in 0..5 {
            session.step(&Action::EndTurn);
        }
        session.observe(&mut obs);
        obs
    };

    let first = run(777);
    let second = run(777);
    assert_eq!(first.tiles, second.tiles);
    assert_eq!(first.units, second.units);
    assert_eq!(first.cities, second.cities);
    assert_eq!(first.players, second.players);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Any seed yields a valid map with correctly placed starts
    #[test]
    fn prop_mapgen_places_valid_starts(seed in 1u64..u64::from(u32::MAX)) {
        let ruleset = Ruleset::load("classic").unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (map, starts) = mapgen::generate(40, 40, 4, &ruleset, &mut rng).unwrap();

        prop_assert_eq!(starts.len(), 4);
        for &s in &starts {
            prop_assert!(s < map.num_tiles());
            prop_assert!(ruleset.terrain[map.tile(s).terrain].can_found_city);
        }
        for i in 0..starts.len() {
            for j in (i + 1)..starts.len() {
                prop_assert_ne!(starts[i], starts[j]);
            }
        }
    }
}
