//! Core library of the socket-based Wave Function Collapse generator.
//! Defines the grid, the collapse engine and its building blocks.

use crate::propagator::PropagationError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use wfc_rules::CatalogError;

/// Next-cell selection strategies.
pub mod entropy;
/// Outbound notifications for the host renderer.
pub mod events;
/// Generic 3D grid and generation cells.
pub mod grid;
/// Constraint propagation logic and traits.
pub mod propagator;
/// The collapse engine state machine.
pub mod runner;
/// Boundary and anchor seeding.
pub mod seeding;
/// Weighted sampling.
pub mod selection;
/// The visitable optimization overlay.
pub mod visitable;

pub use crate::entropy::SelectionStrategy;
pub use crate::events::{TilePlacement, WorldTransform};
pub use crate::grid::{Cell, CellGrid, Grid};
pub use crate::propagator::{ConstraintPropagator, SweepPropagator};
pub use crate::runner::{CollapseEngine, EngineSettings, Phase, RoundOutcome, RunSummary};
pub use crate::selection::{choose_weighted, SelectionError};
pub use crate::visitable::FrontierShape;

/// Errors that can occur while generating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WfcError {
    /// A cell was left with no option during propagation.
    #[error("Contradiction found at ({0}, {1}, {2})")]
    Contradiction(usize, usize, usize),
    /// The selected cell had nothing with a positive weight to choose from.
    #[error("No valid option for cell ({0}, {1}, {2})")]
    NoValidOption(usize, usize, usize),
    /// The tile catalog failed validation.
    #[error("Malformed catalog: {0}")]
    MalformedCatalog(#[from] CatalogError),
    /// A grid axis is below the supported minimum.
    #[error("Grid dimension {axis} is {size}, must be at least {min}")]
    DimensionTooSmall { axis: char, size: usize, min: usize },
    /// A border ring needs at least two layers.
    #[error("Border tile requires at least 2 Y layers, grid has {0}")]
    BorderNeedsLayers(usize),
    /// Every allowed attempt ended in a contradiction.
    #[error("Gave up after {0} attempts")]
    RetriesExhausted(u32),
    /// The run was cancelled between rounds.
    #[error("WFC run interrupted by signal")]
    Interrupted,
    /// An error related to grid coordinates or dimensions.
    #[error("Grid error: {0}")]
    GridError(String),
    /// An unexpected internal error occurred.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl WfcError {
    /// Contradictions are recovered by regeneration; everything else is
    /// returned to the host.
    pub fn is_contradiction(&self) -> bool {
        matches!(self, Self::Contradiction(..) | Self::NoValidOption(..))
    }
}

impl From<PropagationError> for WfcError {
    fn from(err: PropagationError) -> Self {
        match err {
            PropagationError::Contradiction(x, y, z) => Self::Contradiction(x, y, z),
        }
    }
}

/// Information about the current state of a run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProgressInfo {
    /// Collapsed cells in the current attempt.
    pub collapsed_cells: usize,
    /// Cells expected to receive a tile.
    pub total_cells: usize,
    /// Time elapsed since the run started.
    pub elapsed_time: Duration,
    /// Propagation rounds completed in the current attempt.
    pub rounds: u64,
    /// Zero-based index of the current attempt.
    pub attempt: u32,
}
