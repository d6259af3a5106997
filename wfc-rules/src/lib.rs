//! Tile catalog, socket model and adjacency compilation for socket-based
//! Wave Function Collapse.
//!
//! A [`TileCatalog`] is authored by hand or loaded from a file, expanded with
//! rotated variants into an [`ExpandedCatalog`], and compiled into an
//! [`AdjacencyRules`] table the collapse engine propagates with.

#![warn(missing_docs)]

use thiserror::Error;

pub mod catalog;
pub mod direction;
pub mod formats;
pub mod generator;
pub mod loader;
pub mod rules;
pub mod socket;
pub mod types;

pub use catalog::{ExpandedCatalog, TileCatalog};
pub use direction::Direction;
pub use generator::{compile_adjacency, compile_adjacency_into, tiles_fit};
pub use rules::AdjacencyRules;
pub use socket::{BorderKind, Rotation, Socket};
pub use types::{
    CatalogError, Exclusions, Placement, RotationRequest, Sockets, Tile, TileId, TilePrototype,
    TileTransform, TileTypeId,
};

/// Errors raised while loading a catalog from disk.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The file could not be read.
    #[error("I/O error reading file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid for its format.
    #[error("Failed to parse catalog file: {0}")]
    ParseError(String),
    /// The file parsed but holds values the catalog cannot represent.
    #[error("Invalid catalog data: {0}")]
    InvalidData(String),
    /// No parser handles the file extension.
    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(String),
    /// The catalog failed validation.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
