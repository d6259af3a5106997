//! The visitable overlay: an approximate frontier of cells worth
//! re-examining after a collapse.

use crate::grid::CellGrid;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Neighborhood marked visitable around a freshly collapsed cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum FrontierShape {
    /// The six face neighbors.
    Faces6,
    /// Faces plus the twelve edge diagonals.
    #[default]
    Edges18,
    /// The full 3x3x3 block.
    Full26,
}

impl FrontierShape {
    /// Offsets `(dx, dy, dz)` of the neighborhood, excluding the center.
    pub fn offsets(self) -> Vec<(isize, isize, isize)> {
        let mut offsets = Vec::with_capacity(26);
        for dy in -1isize..=1 {
            for dz in -1isize..=1 {
                for dx in -1isize..=1 {
                    let nonzero = [dx, dy, dz].iter().filter(|d| **d != 0).count();
                    let keep = match self {
                        Self::Faces6 => nonzero == 1,
                        Self::Edges18 => nonzero == 1 || nonzero == 2,
                        Self::Full26 => nonzero > 0,
                    };
                    if keep {
                        offsets.push((dx, dy, dz));
                    }
                }
            }
        }
        offsets
    }
}

/// Marks the cell at `coords` and its in-bounds neighborhood visitable.
/// Returns how many cells became visitable.
pub fn mark_frontier(grid: &mut CellGrid, coords: (usize, usize, usize), shape: FrontierShape) -> usize {
    let mut marked = 0;
    let targets = std::iter::once(Some(coords))
        .chain(shape.offsets().into_iter().map(|d| grid.offset(coords, d)))
        .flatten()
        .collect::<Vec<_>>();
    for (x, y, z) in targets {
        if let Some(cell) = grid.get_mut(x, y, z) {
            if !cell.visitable {
                cell.visitable = true;
                marked += 1;
            }
        }
    }
    marked
}
