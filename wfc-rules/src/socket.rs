//! Sockets describe the border type of one tile face and decide whether two
//! faces may touch.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Border type carried by a socket. Two faces can only meet when their kinds
/// are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum BorderKind {
    /// Open ground.
    Grass,
    /// Walkable path crossing the face.
    Path,
    /// Water surface.
    Water,
    /// Nothing; the default for unspecified faces.
    #[default]
    Empty,
    /// Side of a wall.
    WallLateral,
    /// Top of a wall.
    WallTop,
    /// Outer corner of a wall.
    WallCornerExt,
    /// Inner corner of a wall.
    WallCornerInt,
    /// Outer ring of the map.
    Border,
    /// Ground adjoining the outer ring.
    GrassBorder,
    /// Underside of the floor layer.
    Solid,
}

/// Quarter-turn rotation around the Y axis.
///
/// Used both as the visual rotation of a tile variant and as the rotation
/// index of its vertical sockets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u16", into = "u16"))]
pub enum Rotation {
    /// No turn.
    #[default]
    Deg0,
    /// Quarter turn clockwise.
    Deg90,
    /// Half turn.
    Deg180,
    /// Quarter turn counter-clockwise.
    Deg270,
}

impl Rotation {
    /// Rotation in degrees.
    pub const fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

impl TryFrom<u16> for Rotation {
    type Error = InvalidRotation;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            other => Err(InvalidRotation(other)),
        }
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

/// A rotation index that is not a multiple of a quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidRotation(pub u16);

impl fmt::Display for InvalidRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rotation index must be 0, 90, 180 or 270, found {}",
            self.0
        )
    }
}

/// Socket of a single tile face.
///
/// `symmetric`/`flipped` only matter on horizontal faces, `rotation` and
/// `rotationally_invariant` only on vertical ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Socket {
    /// Border type; both faces must agree on it.
    pub kind: BorderKind,
    /// Matches the opposite face regardless of winding.
    pub symmetric: bool,
    /// Winding of an asymmetric socket.
    pub flipped: bool,
    /// Rotation index of a vertical socket.
    pub rotation: Rotation,
    /// Vertical socket that matches at any rotation index.
    pub rotationally_invariant: bool,
}

impl Socket {
    /// A horizontal socket that matches itself regardless of winding.
    pub fn symmetric(kind: BorderKind) -> Self {
        Self {
            kind,
            symmetric: true,
            ..Self::default()
        }
    }

    /// A horizontal socket with an explicit winding bit.
    pub fn asymmetric(kind: BorderKind, flipped: bool) -> Self {
        Self {
            kind,
            flipped,
            ..Self::default()
        }
    }

    /// A vertical socket that matches any rotation of an invariant partner.
    pub fn invariant(kind: BorderKind) -> Self {
        Self {
            kind,
            rotationally_invariant: true,
            ..Self::default()
        }
    }

    /// A vertical socket pinned to one rotation index.
    pub fn rotated(kind: BorderKind, rotation: Rotation) -> Self {
        Self {
            kind,
            rotation,
            ..Self::default()
        }
    }

    /// Copy of this socket with a different rotation index.
    pub fn with_rotation(self, rotation: Rotation) -> Self {
        Self { rotation, ..self }
    }

    /// Horizontal face rule: equal kinds, and either side symmetric or the
    /// two winding bits opposite.
    #[inline]
    pub fn fits_horizontally(&self, other: &Socket) -> bool {
        self.kind == other.kind
            && (self.symmetric || other.symmetric || self.flipped != other.flipped)
    }

    /// Vertical face rule: equal kinds, and both rotation invariant or equal
    /// rotation indices.
    #[inline]
    pub fn fits_vertically(&self, other: &Socket) -> bool {
        self.kind == other.kind
            && ((self.rotationally_invariant && other.rotationally_invariant)
                || self.rotation == other.rotation)
    }
}
