//! Catalogs written in RON.

use crate::catalog::TileCatalog;
use crate::formats::FormatParser;
use crate::LoadError;
#[cfg(feature = "serde")]
use crate::socket::{BorderKind, Rotation, Socket};
#[cfg(feature = "serde")]
use crate::types::{
    CatalogError, Exclusions, Placement, RotationRequest, Sockets, TilePrototype, TileTransform,
};
#[cfg(feature = "serde")]
use nalgebra::Vector3;
#[cfg(feature = "serde")]
use serde::Deserialize;

/// Parser for catalogs written in RON (Rusty Object Notation).
pub struct RonFormatParser;

impl Default for RonFormatParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RonFormatParser {
    /// Creates a parser.
    pub fn new() -> Self {
        Self
    }
}

// --- Structs mirroring the RON layout ---

#[cfg(feature = "serde")]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RonSocket {
    kind: BorderKind,
    symmetric: bool,
    flipped: bool,
    /// Kept as a raw integer so a bad value can name the offending tile.
    rotation: u16,
    rotationally_invariant: bool,
}

#[cfg(feature = "serde")]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RonSockets {
    up: RonSocket,
    right: RonSocket,
    down: RonSocket,
    left: RonSocket,
    above: RonSocket,
    below: RonSocket,
}

#[cfg(feature = "serde")]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RonExclusions {
    up: Vec<String>,
    right: Vec<String>,
    down: Vec<String>,
    left: Vec<String>,
}

#[cfg(feature = "serde")]
fn default_probability() -> u32 {
    1
}

#[cfg(feature = "serde")]
fn default_scale() -> (f32, f32, f32) {
    (1.0, 1.0, 1.0)
}

#[cfg(feature = "serde")]
#[derive(Debug, Clone, Deserialize)]
struct RonTile {
    name: String,
    /// Defaults to the tile name.
    #[serde(default)]
    tile_type: Option<String>,
    #[serde(default = "default_probability")]
    probability: u32,
    #[serde(default)]
    mesh: Option<String>,
    #[serde(default)]
    rotation: (f32, f32, f32),
    #[serde(default = "default_scale")]
    scale: (f32, f32, f32),
    #[serde(default)]
    offset: (f32, f32, f32),
    #[serde(default)]
    sockets: RonSockets,
    #[serde(default)]
    exclusions: RonExclusions,
    #[serde(default)]
    rotate_right: bool,
    #[serde(default)]
    rotate_180: bool,
    #[serde(default)]
    rotate_left: bool,
    #[serde(default)]
    fixed: Option<u32>,
    #[serde(default)]
    range: Option<(u32, u32)>,
}

/// Top-level layout of a catalog file.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Deserialize)]
struct RonCatalogFile {
    floor: String,
    ceiling: String,
    #[serde(default)]
    border: Option<String>,
    tiles: Vec<RonTile>,
}

// --- Conversion ---

#[cfg(feature = "serde")]
fn convert_socket(tile: &str, socket: &RonSocket) -> Result<Socket, CatalogError> {
    let rotation = Rotation::try_from(socket.rotation)
        .map_err(|e| CatalogError::InvalidRotationIndex(tile.to_owned(), e.0))?;
    Ok(Socket {
        kind: socket.kind,
        symmetric: socket.symmetric,
        flipped: socket.flipped,
        rotation,
        rotationally_invariant: socket.rotationally_invariant,
    })
}

#[cfg(feature = "serde")]
fn vector((x, y, z): (f32, f32, f32)) -> Vector3<f32> {
    Vector3::new(x, y, z)
}

#[cfg(feature = "serde")]
fn convert_tile(tile: RonTile) -> Result<TilePrototype, CatalogError> {
    let placement = match (tile.fixed, tile.range) {
        (Some(_), Some(_)) => return Err(CatalogError::FixedAndRange(tile.name)),
        (Some(count), None) => Some(Placement::Count(count)),
        (None, Some((min, max))) => Some(Placement::Range { min, max }),
        (None, None) => None,
    };
    let s = &tile.sockets;
    let sockets = Sockets {
        up: convert_socket(&tile.name, &s.up)?,
        right: convert_socket(&tile.name, &s.right)?,
        down: convert_socket(&tile.name, &s.down)?,
        left: convert_socket(&tile.name, &s.left)?,
        above: convert_socket(&tile.name, &s.above)?,
        below: convert_socket(&tile.name, &s.below)?,
    };
    Ok(TilePrototype {
        tile_type: tile.tile_type.unwrap_or_else(|| tile.name.clone()),
        probability: tile.probability,
        mesh: tile.mesh,
        transform: TileTransform {
            rotation: vector(tile.rotation),
            scale: vector(tile.scale),
            position_offset: vector(tile.offset),
        },
        sockets,
        exclusions: Exclusions {
            up: tile.exclusions.up,
            right: tile.exclusions.right,
            down: tile.exclusions.down,
            left: tile.exclusions.left,
        },
        placement,
        rotations: RotationRequest {
            right: tile.rotate_right,
            half: tile.rotate_180,
            left: tile.rotate_left,
        },
        name: tile.name,
    })
}

impl FormatParser for RonFormatParser {
    fn format_name(&self) -> &'static str {
        "Rusty Object Notation (RON)"
    }

    #[cfg(feature = "serde")]
    fn parse(&self, ron_content: &str) -> Result<TileCatalog, LoadError> {
        let file: RonCatalogFile = ron::from_str(ron_content)
            .map_err(|e| LoadError::ParseError(format!("RON deserialization failed: {e}")))?;

        if let Some(index) = file.tiles.iter().position(|t| t.name.trim().is_empty()) {
            return Err(LoadError::InvalidData(format!(
                "Tile #{index} has an empty name"
            )));
        }

        let tiles = file
            .tiles
            .into_iter()
            .map(convert_tile)
            .collect::<Result<Vec<_>, _>>()?;

        let catalog = TileCatalog {
            tiles,
            floor: file.floor,
            ceiling: file.ceiling,
            border: file.border,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    #[cfg(not(feature = "serde"))]
    fn parse(&self, _ron_content: &str) -> Result<TileCatalog, LoadError> {
        Err(LoadError::ParseError(
            "RON parsing requires the 'serde' feature".to_owned(),
        ))
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use crate::direction::Direction;

    const MINIMAL: &str = r#"
    (
        floor: "floor",
        ceiling: "empty",
        tiles: [
            (
                name: "floor",
                probability: 3,
                sockets: (
                    up: (kind: GRASS, symmetric: true),
                    right: (kind: GRASS, symmetric: true),
                    down: (kind: GRASS, symmetric: true),
                    left: (kind: GRASS, symmetric: true),
                    above: (kind: EMPTY, rotationally_invariant: true),
                    below: (kind: SOLID, rotationally_invariant: true),
                ),
                exclusions: (up: ["water"]),
            ),
            (
                name: "empty",
                tile_type: Some("air"),
                mesh: Some("empty.glb"),
                scale: (2.0, 2.0, 2.0),
                rotate_right: true,
                range: Some((1, 2)),
            ),
        ],
    )
    "#;

    #[test]
    fn test_parse_minimal_catalog() {
        let catalog = RonFormatParser::new().parse(MINIMAL).unwrap();
        assert_eq!(catalog.tiles.len(), 2);
        assert_eq!(catalog.border, None);
        let floor = &catalog.tiles[0];
        assert_eq!(floor.tile_type, "floor");
        assert_eq!(floor.probability, 3);
        assert_eq!(floor.sockets.up, Socket::symmetric(BorderKind::Grass));
        assert_eq!(floor.exclusions.get(Direction::Up), ["water".to_owned()]);
        let empty = &catalog.tiles[1];
        assert_eq!(empty.tile_type, "air");
        assert_eq!(empty.probability, 1);
        assert!(empty.rotations.right && !empty.rotations.left);
        assert_eq!(empty.placement, Some(Placement::Range { min: 1, max: 2 }));
        assert!((empty.transform.scale.x - 2.0).abs() < f32::EPSILON);
        assert_eq!(empty.sockets.above, Socket::default());
    }

    #[test]
    fn test_fixed_and_range_conflict() {
        let content = MINIMAL.replace("range: Some((1, 2)),", "range: Some((1, 2)), fixed: Some(1),");
        let err = RonFormatParser::new().parse(&content).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Catalog(CatalogError::FixedAndRange(ref name)) if name == "empty"
        ));
    }

    #[test]
    fn test_bad_rotation_index() {
        let content = MINIMAL.replace(
            "below: (kind: SOLID, rotationally_invariant: true)",
            "below: (kind: SOLID, rotation: 45)",
        );
        let err = RonFormatParser::new().parse(&content).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Catalog(CatalogError::InvalidRotationIndex(_, 45))
        ));
    }

    #[test]
    fn test_syntax_error_is_parse_error() {
        let err = RonFormatParser::new().parse("(floor: ").unwrap_err();
        assert!(matches!(err, LoadError::ParseError(_)));
    }
}
