//! Force-collapsing boundary layers and fixed anchors before generation.

use crate::grid::CellGrid;
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use wfc_rules::{Direction, ExpandedCatalog, Placement, TileId};

/// Collapses every unblocked cell of layer `y` to `tile`.
pub fn seed_layer(grid: &mut CellGrid, y: usize, tile: TileId) -> usize {
    let mut seeded = 0;
    for z in 0..grid.dim_z {
        for x in 0..grid.dim_x {
            if let Some(cell) = grid.get_mut(x, y, z) {
                if !cell.blocked {
                    cell.collapse_to(tile);
                    seeded += 1;
                }
            }
        }
    }
    seeded
}

/// Collapses the outer ring of every layer strictly between the floor and the
/// ceiling to `tile`.
pub fn seed_border(grid: &mut CellGrid, tile: TileId) -> usize {
    let mut seeded = 0;
    let top = grid.dim_y.saturating_sub(1);
    for y in 1..top {
        for z in 0..grid.dim_z {
            for x in 0..grid.dim_x {
                let on_ring = x == 0 || z == 0 || x + 1 == grid.dim_x || z + 1 == grid.dim_z;
                if !on_ring {
                    continue;
                }
                if let Some(cell) = grid.get_mut(x, y, z) {
                    if cell.is_open() {
                        cell.collapse_to(tile);
                        seeded += 1;
                    }
                }
            }
        }
    }
    seeded
}

/// Floor on the lowest layer, border ring, and the ceiling on the highest
/// layer when there is more than one.
pub fn seed_boundaries(grid: &mut CellGrid, catalog: &ExpandedCatalog) -> usize {
    let mut seeded = seed_layer(grid, 0, catalog.floor());
    if let Some(border) = catalog.border() {
        let ring = seed_border(grid, border);
        if ring == 0 {
            warn!("Border tile requested but the grid has no layer between floor and ceiling");
        }
        seeded += ring;
    }
    if grid.dim_y > 1 {
        seeded += seed_layer(grid, grid.dim_y - 1, catalog.ceiling());
    }
    debug!("Seeded {} boundary cells", seeded);
    seeded
}

/// A fixed tile forced into the grid before generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub coords: (usize, usize, usize),
    pub tile: TileId,
}

/// Places the fixed-count and ranged tiles of the catalog at random open
/// cells. The four planar neighbors of each anchor get an artificial entropy
/// of 1 so generation grows outward from it.
pub fn place_anchors<R: Rng + ?Sized>(
    grid: &mut CellGrid,
    catalog: &ExpandedCatalog,
    rng: &mut R,
) -> Vec<Anchor> {
    let mut anchors = Vec::new();
    for tile in catalog.fixed_tiles() {
        let Some(placement) = tile.placement else {
            continue;
        };
        let count = match placement {
            Placement::Count(n) => n,
            Placement::Range { min, max } => rng.gen_range(min..=max),
        };
        for _ in 0..count {
            let open: Vec<usize> = grid
                .iter()
                .enumerate()
                .filter(|(_, cell)| cell.is_open())
                .map(|(index, _)| index)
                .collect();
            let Some(&index) = open.choose(rng) else {
                warn!(
                    "No open cell left for fixed tile '{}', skipping remaining copies",
                    tile.name
                );
                break;
            };
            let coords = grid.coords(index);
            if let Some(cell) = grid.at_mut(index) {
                cell.collapse_to(tile.id);
            }
            for dir in Direction::HORIZONTAL {
                if let Some((x, y, z)) = grid.neighbor(coords, dir) {
                    if let Some(cell) = grid.get_mut(x, y, z) {
                        if cell.is_open() {
                            cell.force_entropy(1);
                        }
                    }
                }
            }
            debug!("Anchored '{}' at {:?}", tile.name, coords);
            anchors.push(Anchor {
                coords,
                tile: tile.id,
            });
        }
    }
    anchors
}
