use crate::grid::CellGrid;
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How the next cell to collapse is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SelectionStrategy {
    /// Lowest entropy first, ties broken uniformly at random.
    #[default]
    MinimumEntropy,
    /// First open cell in index order.
    InOrder,
}

impl SelectionStrategy {
    pub fn from_in_order(in_order: bool) -> Self {
        if in_order {
            Self::InOrder
        } else {
            Self::MinimumEntropy
        }
    }

    /// Flat index of the next cell to collapse, or None when no open cell
    /// remains.
    ///
    /// With `visitable_only`, cells outside the visitable overlay are ignored
    /// as long as at least one visitable open cell exists.
    pub fn select<R: Rng + ?Sized>(
        self,
        grid: &CellGrid,
        visitable_only: bool,
        rng: &mut R,
    ) -> Option<usize> {
        if visitable_only {
            if let Some(index) = self.select_among(grid, true, rng) {
                return Some(index);
            }
        }
        self.select_among(grid, false, rng)
    }

    fn select_among<R: Rng + ?Sized>(
        self,
        grid: &CellGrid,
        visitable_only: bool,
        rng: &mut R,
    ) -> Option<usize> {
        let eligible = |cell: &crate::grid::Cell| cell.is_open() && (!visitable_only || cell.visitable);
        match self {
            Self::InOrder => grid.data.iter().position(eligible),
            Self::MinimumEntropy => {
                let min = grid
                    .data
                    .par_iter()
                    .filter(|cell| eligible(cell))
                    .map(|cell| cell.entropy)
                    .min()?;
                let ties: Vec<usize> = grid
                    .data
                    .iter()
                    .enumerate()
                    .filter(|(_, cell)| eligible(cell) && cell.entropy == min)
                    .map(|(index, _)| index)
                    .collect();
                ties.choose(rng).copied()
            }
        }
    }
}
