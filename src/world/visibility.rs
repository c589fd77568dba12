//! Fog of war: per-player known/visible tile state
//!
//! Each player tracks two bitmaps over the map. `known` is cumulative:
//! once a tile has been seen it stays explored forever. `visible` is the
//! current line of sight and is recomputed from unit and city positions.
//! With fog of war disabled both bitmaps are saturated at game start.

use crate::core::types::PlayerId;
use crate::world::GameWorld;

/// One player's view of the map
#[derive(Debug, Clone)]
pub struct PlayerVision {
    known: Vec<bool>,
    visible: Vec<bool>,
}

impl PlayerVision {
    pub fn new(num_tiles: usize, all_known: bool) -> Self {
        Self {
            known: vec![all_known; num_tiles],
            visible: vec![all_known; num_tiles],
        }
    }

    pub fn is_known(&self, tile: usize) -> bool {
        self.known[tile]
    }

    pub fn is_visible(&self, tile: usize) -> bool {
        self.visible[tile]
    }

    fn reveal(&mut self, tile: usize) {
        self.known[tile] = true;
        self.visible[tile] = true;
    }
}

/// Reveal all tiles within `radius` (Chebyshev) of `center`
pub fn reveal_around(world: &mut GameWorld, player: PlayerId, center: usize, radius: u32) {
    if !world.settings.fog_of_war {
        return; // already saturated
    }
    let (cx, cy) = world.map.coords(center);
    let r = radius as i64;
    for dy in -r..=r {
        for dx in -r..=r {
            let x = i64::from(cx) + dx;
            let y = i64::from(cy) + dy;
            if world.map.contains(x, y) {
                let idx = world.map.index(x as u32, y as u32);
                world.vision[player.index()].reveal(idx);
            }
        }
    }
}

/// Recompute current line of sight for every player from scratch
///
/// `known` is monotone and untouched; only `visible` is rebuilt.
pub fn recompute_visible(world: &mut GameWorld) {
    if !world.settings.fog_of_war {
        return;
    }

    for vision in &mut world.vision {
        vision.visible.iter_mut().for_each(|v| *v = false);
    }

    let mut sources: Vec<(PlayerId, usize, u32)> = Vec::new();
    for player in &world.players {
        if !player.is_alive {
            continue;
        }
        for &unit_id in &player.units {
            if let Some(unit) = world.unit(unit_id) {
                sources.push((player.id, unit.tile, unit.vision));
            }
        }
        let city_radius = world.ruleset.rules.city_vision_radius;
        for &city_id in &player.cities {
            if let Some(city) = world.city(city_id) {
                sources.push((player.id, city.tile, city_radius));
            }
        }
    }

    for (player, center, radius) in sources {
        reveal_around(world, player, center, radius);
    }
}
