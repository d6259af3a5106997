//! Outbound notifications for the host renderer.

use nalgebra::Vector3;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use wfc_rules::{Rotation, Tile, TileId};

/// Where and how a renderer should instantiate a tile.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WorldTransform {
    pub position: Vector3<f32>,
    /// Euler rotation in degrees.
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

/// A finalized cell handed to the rendering sink.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TilePlacement {
    pub coords: (usize, usize, usize),
    pub tile: usize,
    pub name: String,
    pub tile_type: String,
    pub mesh: Option<String>,
    pub rotation: u16,
    pub world: WorldTransform,
}

impl TilePlacement {
    /// Placement of `tile` in the cell at `coords` on a lattice of
    /// `cell_size` spacing.
    pub fn new(coords: (usize, usize, usize), tile: &Tile, tile_type: &str, cell_size: f32) -> Self {
        let (x, y, z) = coords;
        let lattice = Vector3::new(x as f32, y as f32, z as f32) * cell_size;
        Self {
            coords,
            tile: tile.id.0,
            name: tile.name.clone(),
            tile_type: tile_type.to_owned(),
            mesh: tile.mesh.clone(),
            rotation: Rotation::degrees(tile.rotation),
            world: WorldTransform {
                position: lattice + tile.transform.position_offset,
                rotation: tile.transform.rotation,
                scale: tile.transform.scale,
            },
        }
    }

    pub fn tile_id(&self) -> TileId {
        TileId(self.tile)
    }
}

/// Called once per finalized cell when generation is done.
pub type PlacementCallback = Box<dyn FnMut(&TilePlacement) + Send>;

/// Called before the grid is torn down for a regeneration.
pub type RegenerateCallback = Box<dyn FnMut() + Send>;

/// Subscribers scoped to one engine.
#[derive(Default)]
pub struct EngineEvents {
    on_placed: Vec<PlacementCallback>,
    on_regenerate: Vec<RegenerateCallback>,
}

impl EngineEvents {
    pub fn subscribe_placed(&mut self, callback: PlacementCallback) {
        self.on_placed.push(callback);
    }

    pub fn subscribe_regenerate(&mut self, callback: RegenerateCallback) {
        self.on_regenerate.push(callback);
    }

    pub(crate) fn emit_placed(&mut self, placement: &TilePlacement) {
        for callback in &mut self.on_placed {
            callback(placement);
        }
    }

    pub(crate) fn emit_regenerate(&mut self) {
        for callback in &mut self.on_regenerate {
            callback();
        }
    }
}

impl std::fmt::Debug for EngineEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineEvents")
            .field("on_placed", &self.on_placed.len())
            .field("on_regenerate", &self.on_regenerate.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use wfc_rules::{BorderKind, Socket, Sockets, TileCatalog, TilePrototype};

    #[test]
    fn test_world_position_uses_cell_size_and_offset() {
        let mut proto = TilePrototype::new("wall", Sockets::uniform(Socket::symmetric(BorderKind::Solid)));
        proto.transform.position_offset = Vector3::new(0.0, 0.5, 0.0);
        let catalog = TileCatalog::new(vec![proto], "wall", "wall")
            .expand_rotations()
            .unwrap();
        let tile = &catalog.tiles()[0];
        let placement = TilePlacement::new((1, 2, 3), tile, "wall", 2.0);
        assert_eq!(placement.world.position, Vector3::new(2.0, 4.5, 6.0));
        assert_eq!(placement.world.scale, Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(placement.tile_id(), TileId(0));
        assert_eq!(placement.rotation, 0);
    }

    #[test]
    fn test_all_subscribers_are_called() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut events = EngineEvents::default();
        for _ in 0..2 {
            let calls = Arc::clone(&calls);
            events.subscribe_regenerate(Box::new(move || {
                calls.fetch_add(1, Ordering::SeqCst);
            }));
        }
        events.emit_regenerate();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
