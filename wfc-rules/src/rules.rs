//! Compiled adjacency table.

use crate::direction::Direction;
use crate::types::TileId;
use bitvec::prelude::*;

/// Compiled neighbor table: for each tile and each face, the set of tiles
/// allowed on the other side of that face.
///
/// Stored flattened as `dir * n * n + tile * n + other`, so the neighbors of
/// one tile in one direction form a contiguous bit slice of length `n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyRules {
    num_tiles: usize,
    allowed: BitVec,
}

impl AdjacencyRules {
    /// Rules for `num_tiles` tiles with no adjacency allowed yet.
    pub fn new(num_tiles: usize) -> Self {
        Self {
            num_tiles,
            allowed: bitvec![0; Direction::COUNT * num_tiles * num_tiles],
        }
    }

    /// Number of tiles these rules cover.
    pub fn num_tiles(&self) -> usize {
        self.num_tiles
    }

    /// Number of directions these rules are defined for.
    pub fn num_axes(&self) -> usize {
        Direction::COUNT
    }

    #[inline]
    fn row_start(&self, tile: TileId, dir: Direction) -> usize {
        dir.index() * self.num_tiles * self.num_tiles + tile.0 * self.num_tiles
    }

    /// Allows `other` on the `dir` face of `tile`.
    pub fn allow(&mut self, tile: TileId, other: TileId, dir: Direction) {
        if tile.0 >= self.num_tiles || other.0 >= self.num_tiles {
            return;
        }
        let index = self.row_start(tile, dir) + other.0;
        self.allowed.set(index, true);
    }

    /// `true` if `other` may sit on the `dir` face of `tile`. Out of range
    /// ids are never allowed.
    #[inline]
    pub fn check(&self, tile: TileId, other: TileId, dir: Direction) -> bool {
        if tile.0 >= self.num_tiles || other.0 >= self.num_tiles {
            return false;
        }
        self.allowed[self.row_start(tile, dir) + other.0]
    }

    /// Tiles allowed on the `dir` face of `tile`, one bit per tile id.
    #[inline]
    pub fn neighbors(&self, tile: TileId, dir: Direction) -> &BitSlice {
        let start = self.row_start(tile, dir);
        &self.allowed[start..start + self.num_tiles]
    }

    /// Drops every allowed pair, keeping the tile count.
    pub fn clear(&mut self) {
        self.allowed.fill(false);
    }

    /// Number of allowed `(tile, other, dir)` triples.
    pub fn count_allowed(&self) -> usize {
        self.allowed.count_ones()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_and_check() {
        let mut rules = AdjacencyRules::new(3);
        rules.allow(TileId(0), TileId(2), Direction::Right);
        assert!(rules.check(TileId(0), TileId(2), Direction::Right));
        assert!(!rules.check(TileId(2), TileId(0), Direction::Right));
        assert!(!rules.check(TileId(0), TileId(2), Direction::Left));
        assert!(!rules.check(TileId(0), TileId(7), Direction::Right));
        assert_eq!(rules.count_allowed(), 1);
    }

    #[test]
    fn test_neighbors_is_row_slice() {
        let mut rules = AdjacencyRules::new(4);
        rules.allow(TileId(1), TileId(0), Direction::Above);
        rules.allow(TileId(1), TileId(3), Direction::Above);
        let row = rules.neighbors(TileId(1), Direction::Above);
        assert_eq!(row.len(), 4);
        assert_eq!(row.iter_ones().collect::<Vec<_>>(), vec![0, 3]);
        assert!(rules.neighbors(TileId(1), Direction::Below).not_any());
    }

    #[test]
    fn test_clear_keeps_size() {
        let mut rules = AdjacencyRules::new(2);
        rules.allow(TileId(0), TileId(1), Direction::Up);
        rules.clear();
        assert_eq!(rules.count_allowed(), 0);
        assert_eq!(rules.num_tiles(), 2);
        assert_eq!(rules.neighbors(TileId(0), Direction::Up).len(), 2);
    }
}
