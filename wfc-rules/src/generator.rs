//! Adjacency compilation: decides which tiles may touch on each face.

use crate::catalog::ExpandedCatalog;
use crate::direction::Direction;
use crate::rules::AdjacencyRules;
use crate::types::{Tile, TileId};
use log::debug;
use rayon::prelude::*;

/// Whether `other` may sit on the `dir` face of `tile`.
///
/// Horizontal faces compare the facing sockets with the winding rule and
/// consult both tiles' exclusion lists. Vertical faces compare the facing
/// sockets with the rotation-index rule and ignore exclusions.
pub fn tiles_fit(tile: &Tile, other: &Tile, dir: Direction) -> bool {
    let mine = tile.sockets.get(dir);
    let theirs = other.sockets.get(dir.opposite());
    if dir.is_vertical() {
        return mine.fits_vertically(theirs);
    }
    mine.fits_horizontally(theirs)
        && !tile.exclusions.get(dir).contains(&other.type_id)
        && !other.exclusions.get(dir.opposite()).contains(&tile.type_id)
}

/// Compiles the neighbor table of an expanded catalog.
///
/// Compiling the same catalog twice yields equal tables.
pub fn compile_adjacency(catalog: &ExpandedCatalog) -> AdjacencyRules {
    let mut rules = AdjacencyRules::new(catalog.len());
    compile_adjacency_into(catalog, &mut rules);
    rules
}

/// Recompiles `rules` in place for `catalog`, dropping every previously
/// derived pair first.
pub fn compile_adjacency_into(catalog: &ExpandedCatalog, rules: &mut AdjacencyRules) {
    let tiles = catalog.tiles();
    let num_tiles = tiles.len();
    if rules.num_tiles() == num_tiles {
        rules.clear();
    } else {
        *rules = AdjacencyRules::new(num_tiles);
    }

    // Rows of different tiles are independent
    let pairs: Vec<Vec<(TileId, TileId, Direction)>> = tiles
        .par_iter()
        .map(|tile| {
            let mut allowed = Vec::new();
            for dir in Direction::ALL {
                for other in tiles {
                    if tiles_fit(tile, other, dir) {
                        allowed.push((tile.id, other.id, dir));
                    }
                }
            }
            allowed
        })
        .collect();

    for (tile, other, dir) in pairs.into_iter().flatten() {
        rules.allow(tile, other, dir);
    }
    debug!(
        "Compiled adjacency for {} tiles: {} allowed pairs",
        num_tiles,
        rules.count_allowed()
    );
}
