//! The six face directions of a grid cell.
//!
//! Horizontal directions live in the XZ plane: `Up` is +Z, `Right` is +X,
//! `Down` is -Z and `Left` is -X. `Above` and `Below` follow the Y axis.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::socket::Rotation;

/// One of the six faces of a cell (and of the tile placed in it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// +Z
    Up,
    /// +X
    Right,
    /// -Z
    Down,
    /// -X
    Left,
    /// +Y
    Above,
    /// -Y
    Below,
}

impl Direction {
    /// All directions, in the order used for indexing adjacency tables.
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
        Direction::Above,
        Direction::Below,
    ];

    /// The four directions of the XZ plane.
    pub const HORIZONTAL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Number of directions adjacency is defined for.
    pub const COUNT: usize = 6;

    /// Position of this direction in [`Direction::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
            Direction::Above => 4,
            Direction::Below => 5,
        }
    }

    /// The face pointing the other way.
    #[inline]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Above => Direction::Below,
            Direction::Below => Direction::Above,
        }
    }

    /// `true` for `Above` and `Below`.
    #[inline]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::Above | Direction::Below)
    }

    /// Grid offset `(dx, dy, dz)` of the neighbor on this face.
    #[inline]
    pub const fn offset(self) -> (isize, isize, isize) {
        match self {
            Direction::Up => (0, 0, 1),
            Direction::Right => (1, 0, 0),
            Direction::Down => (0, 0, -1),
            Direction::Left => (-1, 0, 0),
            Direction::Above => (0, 1, 0),
            Direction::Below => (0, -1, 0),
        }
    }

    /// The horizontal face that lands on `self` once a tile is turned by
    /// `rotation`. Turning by 90 degrees moves the old `Up` face to `Right`.
    /// Vertical directions are unaffected.
    pub const fn before_rotation(self, rotation: Rotation) -> Direction {
        let turns = match rotation {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 1,
            Rotation::Deg180 => 2,
            Rotation::Deg270 => 3,
        };
        if self.is_vertical() {
            return self;
        }
        // Up, Right, Down, Left are clockwise in index order
        let idx = (self.index() + 4 - turns) % 4;
        Direction::HORIZONTAL[idx]
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Above => "above",
            Direction::Below => "below",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
    }

    #[test]
    fn test_opposite_offsets_cancel() {
        for dir in Direction::ALL {
            let (ax, ay, az) = dir.offset();
            let (bx, by, bz) = dir.opposite().offset();
            assert_eq!((ax + bx, ay + by, az + bz), (0, 0, 0));
        }
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }

    #[test]
    fn test_before_rotation_quarter_turn() {
        assert_eq!(Direction::Right.before_rotation(Rotation::Deg90), Direction::Up);
        assert_eq!(Direction::Left.before_rotation(Rotation::Deg90), Direction::Down);
        assert_eq!(Direction::Up.before_rotation(Rotation::Deg90), Direction::Left);
        assert_eq!(Direction::Down.before_rotation(Rotation::Deg90), Direction::Right);
        assert_eq!(Direction::Right.before_rotation(Rotation::Deg270), Direction::Down);
        assert_eq!(Direction::Up.before_rotation(Rotation::Deg180), Direction::Down);
        assert_eq!(Direction::Above.before_rotation(Rotation::Deg90), Direction::Above);
    }

    #[test]
    fn test_display_names() {
        let names: Vec<String> = Direction::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["up", "right", "down", "left", "above", "below"]);
    }
}
