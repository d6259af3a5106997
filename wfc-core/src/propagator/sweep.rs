use crate::grid::CellGrid;
use crate::propagator::{
    ConstraintPropagator, PropagationError, PropagationScope, PropagationStats,
};
use bitvec::prelude::*;
use log::trace;
use wfc_rules::{AdjacencyRules, Direction, TileId};

/// Options the live neighbors of `coords` allow, from scratch.
///
/// For each in-bounds, unblocked neighbor the union of its options'
/// neighbor rows facing back at `coords` is intersected into the result.
/// Sides without such a neighbor impose nothing.
pub(crate) fn supported_options(
    grid: &CellGrid,
    rules: &AdjacencyRules,
    coords: (usize, usize, usize),
    num_tiles: usize,
) -> BitVec {
    let mut supported = bitvec![1; num_tiles];
    for dir in Direction::ALL {
        let Some((nx, ny, nz)) = grid.neighbor(coords, dir) else {
            continue;
        };
        let Some(neighbor) = grid.get(nx, ny, nz) else {
            continue;
        };
        if neighbor.blocked {
            continue;
        }
        let mut union = bitvec![0; num_tiles];
        for option in neighbor.options.iter_ones() {
            for allowed in rules.neighbors(TileId(option), dir.opposite()).iter_ones() {
                union.set(allowed, true);
            }
        }
        for tile in 0..num_tiles {
            if supported[tile] && !union[tile] {
                supported.set(tile, false);
            }
        }
    }
    supported
}

/// Re-derives every open cell in one in-place pass over the grid in index
/// order, optionally repeating until nothing changes.
#[derive(Debug, Clone, Default)]
pub struct SweepPropagator {
    to_fixed_point: bool,
}

impl SweepPropagator {
    pub fn new(to_fixed_point: bool) -> Self {
        Self { to_fixed_point }
    }

    fn sweep(
        grid: &mut CellGrid,
        rules: &AdjacencyRules,
        scope: PropagationScope,
        stats: &mut PropagationStats,
    ) -> Result<usize, PropagationError> {
        let mut changed = 0;
        for index in 0..grid.len() {
            let num_tiles = match grid.at(index) {
                Some(cell)
                    if cell.is_open()
                        && (scope == PropagationScope::All || cell.visitable) =>
                {
                    cell.options.len()
                }
                _ => continue,
            };
            let coords = grid.coords(index);
            let supported = supported_options(grid, rules, coords, num_tiles);
            let Some(cell) = grid.at_mut(index) else {
                continue;
            };
            stats.cells_visited += 1;

            let mut next = cell.options.clone();
            for tile in cell.options.iter_ones() {
                if !supported[tile] {
                    next.set(tile, false);
                }
            }
            if next != cell.options {
                cell.set_options(next);
                changed += 1;
            }
            if cell.option_count() == 0 {
                let (x, y, z) = coords;
                return Err(PropagationError::Contradiction(x, y, z));
            }
        }
        Ok(changed)
    }
}

impl ConstraintPropagator for SweepPropagator {
    fn propagate(
        &mut self,
        grid: &mut CellGrid,
        rules: &AdjacencyRules,
        scope: PropagationScope,
    ) -> Result<PropagationStats, PropagationError> {
        let mut stats = PropagationStats::default();
        // every productive sweep removes at least one option somewhere
        let max_sweeps = grid.len() * rules.num_tiles() + 1;
        loop {
            stats.sweeps += 1;
            let changed = Self::sweep(grid, rules, scope, &mut stats)?;
            stats.cells_changed += changed;
            trace!("Sweep {}: {} cells changed", stats.sweeps, changed);
            if !self.to_fixed_point || changed == 0 || stats.sweeps >= max_sweeps {
                break;
            }
        }
        Ok(stats)
    }
}
