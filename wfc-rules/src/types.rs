//! Tile, socket-set and placement types shared by the catalog and the engine.

use crate::direction::Direction;
use crate::socket::{Rotation, Socket};
use nalgebra::Vector3;
use thiserror::Error;

/// Index of a tile in an expanded catalog.
///
/// Used as the bit position in cell option sets and as the row index of
/// adjacency tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub usize);

/// Interned tile type name. Rotated variants share the id of their source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileTypeId(pub u32);

/// Errors raised while validating or expanding a tile catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog contains no tiles at all.
    #[error("Tile catalog is empty.")]
    Empty,
    /// Two authored tiles share the same name.
    #[error("Duplicate tile name: {0}")]
    DuplicateName(String),
    /// A tile asks for both a fixed count and a count range.
    #[error("Tile '{0}' is marked both as a fixed tile and a range tile")]
    FixedAndRange(String),
    /// A range placement has `min > max`.
    #[error("Tile '{name}' has an inverted placement range ({min}..={max})")]
    InvertedRange {
        /// Offending tile.
        name: String,
        /// Lower bound as authored.
        min: u32,
        /// Upper bound as authored.
        max: u32,
    },
    /// Rotated variants are requested but the tile has no mesh to rotate.
    #[error("Tile '{0}' requests rotated variants but has no mesh")]
    RotationWithoutMesh(String),
    /// The floor, ceiling or border refers to a tile that does not exist.
    #[error("Unknown {role} tile: {name}")]
    UnknownTile {
        /// `"floor"`, `"ceiling"` or `"border"`.
        role: &'static str,
        /// Name that failed to resolve.
        name: String,
    },
    /// A vertical socket carries a rotation index that is not a quarter turn.
    #[error("Tile '{0}' has an invalid vertical rotation index: {1}")]
    InvalidRotationIndex(String, u16),
}

/// Geometric data handed to the renderer untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileTransform {
    /// Euler rotation in degrees.
    pub rotation: Vector3<f32>,
    /// Per-axis scale of the instantiated mesh.
    pub scale: Vector3<f32>,
    /// Added to the cell's world position.
    pub position_offset: Vector3<f32>,
}

impl Default for TileTransform {
    fn default() -> Self {
        Self {
            rotation: Vector3::zeros(),
            scale: Vector3::repeat(1.0),
            position_offset: Vector3::zeros(),
        }
    }
}

/// The six sockets of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sockets {
    /// +Z face.
    pub up: Socket,
    /// +X face.
    pub right: Socket,
    /// -Z face.
    pub down: Socket,
    /// -X face.
    pub left: Socket,
    /// Top face.
    pub above: Socket,
    /// Bottom face.
    pub below: Socket,
}

impl Sockets {
    /// Same socket on every face.
    pub fn uniform(socket: Socket) -> Self {
        Self {
            up: socket,
            right: socket,
            down: socket,
            left: socket,
            above: socket,
            below: socket,
        }
    }

    /// Socket on the given face.
    pub fn get(&self, dir: Direction) -> &Socket {
        match dir {
            Direction::Up => &self.up,
            Direction::Right => &self.right,
            Direction::Down => &self.down,
            Direction::Left => &self.left,
            Direction::Above => &self.above,
            Direction::Below => &self.below,
        }
    }

    /// Sockets of the tile after turning it by `rotation` around Y.
    ///
    /// Horizontal sockets are permuted; vertical sockets keep their kind and
    /// invariance but take `rotation` as their rotation index.
    pub fn rotated(&self, rotation: Rotation) -> Self {
        let face = |dir: Direction| *self.get(dir.before_rotation(rotation));
        Self {
            up: face(Direction::Up),
            right: face(Direction::Right),
            down: face(Direction::Down),
            left: face(Direction::Left),
            above: self.above.with_rotation(rotation),
            below: self.below.with_rotation(rotation),
        }
    }
}

/// Per-face lists of tile types a tile refuses as neighbors. Only the four
/// horizontal faces carry exclusions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusions<T> {
    /// Refused on the +Z face.
    pub up: Vec<T>,
    /// Refused on the +X face.
    pub right: Vec<T>,
    /// Refused on the -Z face.
    pub down: Vec<T>,
    /// Refused on the -X face.
    pub left: Vec<T>,
}

impl<T> Default for Exclusions<T> {
    fn default() -> Self {
        Self {
            up: Vec::new(),
            right: Vec::new(),
            down: Vec::new(),
            left: Vec::new(),
        }
    }
}

impl<T: Clone> Exclusions<T> {
    /// Exclusions on the given face; always empty for vertical faces.
    pub fn get(&self, dir: Direction) -> &[T] {
        match dir {
            Direction::Up => &self.up,
            Direction::Right => &self.right,
            Direction::Down => &self.down,
            Direction::Left => &self.left,
            Direction::Above | Direction::Below => &[],
        }
    }

    fn get_mut(&mut self, dir: Direction) -> Option<&mut Vec<T>> {
        match dir {
            Direction::Up => Some(&mut self.up),
            Direction::Right => Some(&mut self.right),
            Direction::Down => Some(&mut self.down),
            Direction::Left => Some(&mut self.left),
            Direction::Above | Direction::Below => None,
        }
    }

    /// Adds an exclusion; ignored for vertical faces.
    pub fn push(&mut self, dir: Direction, value: T) {
        if let Some(list) = self.get_mut(dir) {
            list.push(value);
        }
    }

    /// Exclusions follow their faces when the tile is turned.
    pub fn rotated(&self, rotation: Rotation) -> Self {
        let face = |dir: Direction| self.get(dir.before_rotation(rotation)).to_vec();
        Self {
            up: face(Direction::Up),
            right: face(Direction::Right),
            down: face(Direction::Down),
            left: face(Direction::Left),
        }
    }

    /// Maps every entry, failing on the first error.
    pub fn try_map<U, E>(&self, mut f: impl FnMut(&T) -> Result<U, E>) -> Result<Exclusions<U>, E> {
        let mut convert = |list: &[T]| list.iter().map(&mut f).collect::<Result<Vec<U>, E>>();
        Ok(Exclusions {
            up: convert(&self.up)?,
            right: convert(&self.right)?,
            down: convert(&self.down)?,
            left: convert(&self.left)?,
        })
    }
}

/// How many copies of a tile are force-placed before normal generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Exactly this many copies.
    Count(u32),
    /// A uniformly drawn count in `min..=max`.
    Range {
        /// Fewest copies.
        min: u32,
        /// Most copies.
        max: u32,
    },
}

impl Placement {
    /// Inclusive bounds of the count.
    pub fn bounds(&self) -> (u32, u32) {
        match *self {
            Placement::Count(n) => (n, n),
            Placement::Range { min, max } => (min, max),
        }
    }
}

/// Which rotated variants to synthesize from an authored tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RotationRequest {
    /// Quarter turn clockwise (`_RotateRight`).
    pub right: bool,
    /// Half turn (`_Rotate180`).
    pub half: bool,
    /// Quarter turn counter-clockwise (`_RotateLeft`).
    pub left: bool,
}

impl RotationRequest {
    /// All three quarter turns.
    pub fn all() -> Self {
        Self {
            right: true,
            half: true,
            left: true,
        }
    }

    /// Requested rotations with the name suffix of each variant.
    pub fn requested(&self) -> impl Iterator<Item = (Rotation, &'static str)> {
        [
            (self.right, Rotation::Deg90, "_RotateRight"),
            (self.half, Rotation::Deg180, "_Rotate180"),
            (self.left, Rotation::Deg270, "_RotateLeft"),
        ]
        .into_iter()
        .filter(|(wanted, _, _)| *wanted)
        .map(|(_, rotation, suffix)| (rotation, suffix))
    }

    /// `true` if at least one variant is requested.
    pub fn any(&self) -> bool {
        self.right || self.half || self.left
    }
}

/// A tile as written by the catalog author.
#[derive(Debug, Clone, PartialEq)]
pub struct TilePrototype {
    /// Unique name, used to reference the tile from the catalog header.
    pub name: String,
    /// Type name used by exclusion lists. Shared by rotated variants.
    pub tile_type: String,
    /// Sampling weight.
    pub probability: u32,
    /// Opaque asset key for the renderer.
    pub mesh: Option<String>,
    /// Rotation, scale and offset passed through to placements.
    pub transform: TileTransform,
    /// Connection labels on the six faces.
    pub sockets: Sockets,
    /// Neighbor types refused per horizontal face, by type name.
    pub exclusions: Exclusions<String>,
    /// Forced copies placed while seeding, if any.
    pub placement: Option<Placement>,
    /// Rotated variants to add on expansion.
    pub rotations: RotationRequest,
}

impl TilePrototype {
    /// A tile whose type equals its name, with weight 1 and no mesh.
    pub fn new(name: impl Into<String>, sockets: Sockets) -> Self {
        let name = name.into();
        Self {
            tile_type: name.clone(),
            name,
            probability: 1,
            mesh: None,
            transform: TileTransform::default(),
            sockets,
            exclusions: Exclusions::default(),
            placement: None,
            rotations: RotationRequest::default(),
        }
    }

    /// Overrides the type name used by exclusion lists.
    pub fn with_type(mut self, tile_type: impl Into<String>) -> Self {
        self.tile_type = tile_type.into();
        self
    }

    /// Sets the sampling weight. A weight of 0 keeps the tile out of normal
    /// selection; it can still be placed as an anchor.
    pub fn with_probability(mut self, probability: u32) -> Self {
        self.probability = probability;
        self
    }

    /// Sets the renderer asset key. Required for rotated variants.
    pub fn with_mesh(mut self, mesh: impl Into<String>) -> Self {
        self.mesh = Some(mesh.into());
        self
    }

    /// Requests rotated variants.
    pub fn with_rotations(mut self, rotations: RotationRequest) -> Self {
        self.rotations = rotations;
        self
    }

    /// Force-places copies of this tile while seeding.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = Some(placement);
        self
    }

    /// Refuses tiles of `tile_type` on the `dir` face.
    pub fn excluding(mut self, dir: Direction, tile_type: impl Into<String>) -> Self {
        self.exclusions.push(dir, tile_type.into());
        self
    }
}

/// A tile of the working catalog: either an authored tile or one of its
/// rotated variants, with type names resolved to ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    /// Position in the expanded catalog.
    pub id: TileId,
    /// Authored name, with a rotation suffix for variants.
    pub name: String,
    /// Interned type, shared with the source tile.
    pub type_id: TileTypeId,
    /// Sampling weight.
    pub probability: u32,
    /// Renderer asset key.
    pub mesh: Option<String>,
    /// Transform of the authored tile.
    pub transform: TileTransform,
    /// Quarter turn applied to the authored tile to obtain this one.
    pub rotation: Rotation,
    /// Authored tile this one was derived from (itself for originals).
    pub source: TileId,
    /// Sockets after rotation.
    pub sockets: Sockets,
    /// Exclusions after rotation, with type names resolved.
    pub exclusions: Exclusions<TileTypeId>,
    /// Anchor placement; only authored tiles carry one.
    pub placement: Option<Placement>,
}

impl Tile {
    /// `true` for variants synthesized by rotation expansion.
    pub fn is_variant(&self) -> bool {
        self.id != self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::socket::BorderKind;

    fn distinct_sockets() -> Sockets {
        Sockets {
            up: Socket::asymmetric(BorderKind::Path, false),
            right: Socket::symmetric(BorderKind::Grass),
            down: Socket::asymmetric(BorderKind::Water, true),
            left: Socket::symmetric(BorderKind::WallLateral),
            above: Socket::invariant(BorderKind::Empty),
            below: Socket::rotated(BorderKind::Solid, Rotation::Deg0),
        }
    }

    #[test]
    fn test_rotate_90_permutes_faces() {
        let original = distinct_sockets();
        let rotated = original.rotated(Rotation::Deg90);
        assert_eq!(rotated.right, original.up);
        assert_eq!(rotated.left, original.down);
        assert_eq!(rotated.up, original.left);
        assert_eq!(rotated.down, original.right);
        assert_eq!(rotated.above.kind, original.above.kind);
        assert_eq!(rotated.above.rotation, Rotation::Deg90);
        assert_eq!(rotated.below.rotation, Rotation::Deg90);
        assert!(rotated.above.rotationally_invariant);
    }

    #[test]
    fn test_rotate_180_and_270() {
        let original = distinct_sockets();
        let half = original.rotated(Rotation::Deg180);
        assert_eq!(half.right, original.left);
        assert_eq!(half.up, original.down);
        let left = original.rotated(Rotation::Deg270);
        assert_eq!(left.right, original.down);
        assert_eq!(left.left, original.up);
        assert_eq!(left.up, original.right);
        assert_eq!(left.down, original.left);
        assert_eq!(left.below.rotation, Rotation::Deg270);
    }

    #[test]
    fn test_exclusions_follow_faces() {
        let mut exclusions = Exclusions::default();
        exclusions.push(Direction::Up, "water");
        exclusions.push(Direction::Above, "ignored");
        assert!(exclusions.get(Direction::Above).is_empty());
        let rotated = exclusions.rotated(Rotation::Deg90);
        assert_eq!(rotated.get(Direction::Right), ["water"]);
        assert!(rotated.get(Direction::Up).is_empty());
    }

    #[test]
    fn test_rotation_request_order() {
        let requested: Vec<_> = RotationRequest::all().requested().collect();
        assert_eq!(
            requested,
            vec![
                (Rotation::Deg90, "_RotateRight"),
                (Rotation::Deg180, "_Rotate180"),
                (Rotation::Deg270, "_RotateLeft"),
            ]
        );
        assert!(!RotationRequest::default().any());
    }
}
