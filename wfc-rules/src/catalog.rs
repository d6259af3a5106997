//! Authored tile catalog and its expansion into the working tile set.

use crate::socket::Rotation;
use crate::types::{CatalogError, Tile, TileId, TilePrototype, TileTypeId};
use log::debug;
use std::collections::HashMap;
use std::collections::HashSet;

/// The tile catalog exactly as authored, plus the roles some tiles play
/// during seeding.
///
/// Every expansion starts from this value. An [`ExpandedCatalog`] cannot be
/// expanded again, so rotated variants never get rotated twice.
#[derive(Debug, Clone, PartialEq)]
pub struct TileCatalog {
    /// Authored tiles, in the order ids are assigned.
    pub tiles: Vec<TilePrototype>,
    /// Name of the tile laid on the lowest layer.
    pub floor: String,
    /// Name of the empty tile laid on the highest layer.
    pub ceiling: String,
    /// Name of the tile laid on the outer ring of the intermediate layers.
    pub border: Option<String>,
}

impl TileCatalog {
    /// A catalog without a border tile.
    pub fn new(
        tiles: Vec<TilePrototype>,
        floor: impl Into<String>,
        ceiling: impl Into<String>,
    ) -> Self {
        Self {
            tiles,
            floor: floor.into(),
            ceiling: ceiling.into(),
            border: None,
        }
    }

    /// Lays `border` around the intermediate layers while seeding.
    pub fn with_border(mut self, border: impl Into<String>) -> Self {
        self.border = Some(border.into());
        self
    }

    /// Checks the catalog for authoring mistakes.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.tiles.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut names = HashSet::new();
        for tile in &self.tiles {
            if !names.insert(tile.name.as_str()) {
                return Err(CatalogError::DuplicateName(tile.name.clone()));
            }
            if tile.rotations.any() && tile.mesh.is_none() {
                return Err(CatalogError::RotationWithoutMesh(tile.name.clone()));
            }
            if let Some(placement) = tile.placement {
                let (min, max) = placement.bounds();
                if min > max {
                    return Err(CatalogError::InvertedRange {
                        name: tile.name.clone(),
                        min,
                        max,
                    });
                }
            }
        }
        let roles = [
            ("floor", Some(&self.floor)),
            ("ceiling", Some(&self.ceiling)),
            ("border", self.border.as_ref()),
        ];
        for (role, name) in roles {
            if let Some(name) = name {
                if !names.contains(name.as_str()) {
                    return Err(CatalogError::UnknownTile {
                        role,
                        name: name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Builds the working tile set: all authored tiles, in order, followed by
    /// the requested 90/180/270 degree variants of each.
    pub fn expand_rotations(&self) -> Result<ExpandedCatalog, CatalogError> {
        self.validate()?;

        let mut interner = TypeInterner::default();
        let mut tiles = Vec::with_capacity(self.tiles.len());

        for (index, proto) in self.tiles.iter().enumerate() {
            let type_id = interner.intern(&proto.tile_type);
            let exclusions = proto
                .exclusions
                .try_map(|name| Ok::<_, CatalogError>(interner.intern(name)))?;
            tiles.push(Tile {
                id: TileId(index),
                name: proto.name.clone(),
                type_id,
                probability: proto.probability,
                mesh: proto.mesh.clone(),
                transform: proto.transform,
                rotation: Rotation::Deg0,
                source: TileId(index),
                sockets: proto.sockets,
                exclusions,
                placement: proto.placement,
            });
        }

        let authored = tiles.len();
        for source in 0..authored {
            let requested: Vec<_> = self.tiles[source].rotations.requested().collect();
            for (rotation, suffix) in requested {
                let original = &tiles[source];
                let mut transform = original.transform;
                transform.rotation.x = 0.0;
                transform.rotation.y = f32::from(rotation.degrees());
                transform.rotation.z = 0.0;
                let variant = Tile {
                    id: TileId(tiles.len()),
                    name: format!("{}{}", original.name, suffix),
                    type_id: original.type_id,
                    probability: original.probability,
                    mesh: original.mesh.clone(),
                    transform,
                    rotation,
                    source: original.id,
                    sockets: original.sockets.rotated(rotation),
                    exclusions: original.exclusions.rotated(rotation),
                    placement: None,
                };
                tiles.push(variant);
            }
        }

        debug!(
            "Expanded catalog: {} authored tiles, {} rotated variants, {} tile types",
            authored,
            tiles.len() - authored,
            interner.names.len()
        );

        let lookup = |role: &'static str, name: &str| {
            tiles[..authored]
                .iter()
                .find(|t| t.name == name)
                .map(|t| t.id)
                .ok_or_else(|| CatalogError::UnknownTile {
                    role,
                    name: name.to_owned(),
                })
        };
        let floor = lookup("floor", &self.floor)?;
        let ceiling = lookup("ceiling", &self.ceiling)?;
        let border = self
            .border
            .as_deref()
            .map(|name| lookup("border", name))
            .transpose()?;

        Ok(ExpandedCatalog {
            tiles,
            type_names: interner.names,
            floor,
            ceiling,
            border,
        })
    }
}

/// Resolves type names to small integer ids, once per expansion.
#[derive(Debug, Default)]
struct TypeInterner {
    ids: HashMap<String, TileTypeId>,
    names: Vec<String>,
}

impl TypeInterner {
    fn intern(&mut self, name: &str) -> TileTypeId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = TileTypeId(self.names.len() as u32);
        self.names.push(name.to_owned());
        self.ids.insert(name.to_owned(), id);
        id
    }
}

/// The working tile set used by the adjacency compiler and the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandedCatalog {
    tiles: Vec<Tile>,
    type_names: Vec<String>,
    floor: TileId,
    ceiling: TileId,
    border: Option<TileId>,
}

impl ExpandedCatalog {
    /// Number of tiles, rotated variants included.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// `true` if the catalog holds no tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// All tiles, indexed by [`TileId`].
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tile with the given id, if in range.
    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id.0)
    }

    /// Looks a tile up by its full name, e.g. `"path_RotateRight"`.
    pub fn by_name(&self, name: &str) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.name == name)
    }

    /// Name behind an interned type id.
    pub fn type_name(&self, id: TileTypeId) -> Option<&str> {
        self.type_names.get(id.0 as usize).map(String::as_str)
    }

    /// Tile seeded on layer 0.
    pub fn floor(&self) -> TileId {
        self.floor
    }

    /// Tile seeded on the top layer.
    pub fn ceiling(&self) -> TileId {
        self.ceiling
    }

    /// Tile seeded on the outer ring, if configured.
    pub fn border(&self) -> Option<TileId> {
        self.border
    }

    /// Tiles with a fixed-placement policy, in catalog order.
    pub fn fixed_tiles(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.iter().filter(|t| t.placement.is_some())
    }
}
