//! Tile grid and index math
//!
//! The map is a dense row-major grid; tile index = y * width + x. Edges
//! do not wrap: stepping off the map yields `None`.

use serde::{Deserialize, Serialize};

use crate::core::types::{CityId, Direction, PlayerId, UnitId};

/// Extras bitmask: a finished road
pub const EXTRA_ROAD: u8 = 1;
/// Extras bitmask: finished irrigation
pub const EXTRA_IRRIGATION: u8 = 2;
/// Extras bitmask: a finished mine
pub const EXTRA_MINE: u8 = 4;

/// One map cell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    /// Terrain catalog index
    pub terrain: usize,
    /// Claiming player, if any
    pub owner: Option<PlayerId>,
    /// City sitting on this tile, if any
    pub city: Option<CityId>,
    /// Units currently on this tile
    pub units: Vec<UnitId>,
    /// Bitmask of `EXTRA_*` improvements
    pub extras: u8,
}

impl Tile {
    fn new(terrain: usize) -> Self {
        Self {
            terrain,
            owner: None,
            city: None,
            units: Vec::new(),
            extras: 0,
        }
    }

    pub fn has_extra(&self, extra: u8) -> bool {
        self.extras & extra != 0
    }
}

/// Dense rectangular tile grid
#[derive(Debug, Clone)]
pub struct Map {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl Map {
    /// Create a map filled with `fill_terrain`
    pub fn new(width: u32, height: u32, fill_terrain: usize) -> Self {
        let tiles = vec![Tile::new(fill_terrain); (width * height) as usize];
        Self {
            width,
            height,
            tiles,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn num_tiles(&self) -> usize {
        self.tiles.len()
    }

    pub fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    pub fn coords(&self, index: usize) -> (u32, u32) {
        let index = index as u32;
        (index % self.width, index / self.width)
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height)
    }

    pub fn tile(&self, index: usize) -> &Tile {
        &self.tiles[index]
    }

    pub fn tile_mut(&mut self, index: usize) -> &mut Tile {
        &mut self.tiles[index]
    }

    pub fn tile_at(&self, x: u32, y: u32) -> Option<&Tile> {
        if x < self.width && y < self.height {
            Some(&self.tiles[self.index(x, y)])
        } else {
            None
        }
    }

    /// Step one tile in `dir`; `None` past the map edge
    pub fn step(&self, from: usize, dir: Direction) -> Option<usize> {
        let (x, y) = self.coords(from);
        let (dx, dy) = dir.offset();
        let nx = i64::from(x) + i64::from(dx);
        let ny = i64::from(y) + i64::from(dy);
        if self.contains(nx, ny) {
            Some(self.index(nx as u32, ny as u32))
        } else {
            None
        }
    }

    /// All in-bounds neighbors of a tile
    pub fn neighbors<'a>(&'a self, from: usize) -> impl Iterator<Item = usize> + 'a {
        Direction::ALL
            .iter()
            .filter_map(move |&dir| self.step(from, dir))
    }

    /// Chebyshev distance between two tiles
    pub fn distance(&self, a: usize, b: usize) -> u32 {
        let (ax, ay) = self.coords(a);
        let (bx, by) = self.coords(b);
        let dx = ax.abs_diff(bx);
        let dy = ay.abs_diff(by);
        dx.max(dy)
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_math() {
        let map = Map::new(10, 5, 0);
        assert_eq!(map.num_tiles(), 50);
        assert_eq!(map.index(3, 2), 23);
        assert_eq!(map.coords(23), (3, 2));
    }

    #[test]
    fn test_step_stops_at_edges() {
        let map = Map::new(4, 4, 0);
        let corner = map.index(0, 0);
        assert_eq!(map.step(corner, Direction::North), None);
        assert_eq!(map.step(corner, Direction::West), None);
        assert_eq!(map.step(corner, Direction::East), Some(map.index(1, 0)));
        assert_eq!(map.step(corner, Direction::Southeast), Some(map.index(1, 1)));

        let far = map.index(3, 3);
        assert_eq!(map.step(far, Direction::South), None);
        assert_eq!(map.step(far, Direction::Northwest), Some(map.index(2, 2)));
    }

    #[test]
    fn test_neighbors_count() {
        let map = Map::new(4, 4, 0);
        assert_eq!(map.neighbors(map.index(0, 0)).count(), 3);
        assert_eq!(map.neighbors(map.index(1, 1)).count(), 8);
        assert_eq!(map.neighbors(map.index(3, 0)).count(), 3);
    }

    #[test]
    fn test_distance_is_chebyshev() {
        let map = Map::new(10, 10, 0);
        assert_eq!(map.distance(map.index(1, 1), map.index(4, 2)), 3);
        assert_eq!(map.distance(map.index(5, 5), map.index(5, 5)), 0);
    }
}
