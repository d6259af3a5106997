//! Constraint propagation logic and traits.

use crate::grid::CellGrid;
use std::fmt::Debug;
use thiserror::Error;
use wfc_rules::AdjacencyRules;

pub mod sweep;

pub use sweep::SweepPropagator;

/// Errors that can occur during the constraint propagation phase.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PropagationError {
    /// A cell's option set became empty.
    #[error("Contradiction detected during propagation at ({0}, {1}, {2})")]
    Contradiction(usize, usize, usize),
}

/// Which cells a propagation pass re-derives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationScope {
    /// Every open cell.
    All,
    /// Open cells inside the visitable overlay.
    VisitableOnly,
}

/// Counters reported by one propagation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationStats {
    pub sweeps: usize,
    pub cells_visited: usize,
    pub cells_changed: usize,
}

/// Re-derives cell option sets from their neighbors.
pub trait ConstraintPropagator: Send + Debug {
    /// Updates `grid` in place. Collapsed and blocked cells are never
    /// modified.
    fn propagate(
        &mut self,
        grid: &mut CellGrid,
        rules: &AdjacencyRules,
        scope: PropagationScope,
    ) -> Result<PropagationStats, PropagationError>;
}

/// Finds an open cell holding an option that some live neighbor cannot
/// support. Returns its coordinates.
pub fn find_unsupported(grid: &CellGrid, rules: &AdjacencyRules) -> Option<(usize, usize, usize)> {
    (0..grid.len()).find_map(|index| {
        let cell = grid.at(index)?;
        if !cell.is_open() {
            return None;
        }
        let coords = grid.coords(index);
        let supported = sweep::supported_options(grid, rules, coords, cell.options.len());
        let holds_unsupported = cell.options.iter_ones().any(|tile| !supported[tile]);
        holds_unsupported.then_some(coords)
    })
}
