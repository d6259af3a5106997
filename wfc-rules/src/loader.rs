//! Loading tile catalogs from files.

use crate::catalog::TileCatalog;
use crate::formats::{FormatParser, RonFormatParser};
use crate::LoadError;
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Picks a parser from the file extension.
pub fn parser_for_path(path: &Path) -> Result<Box<dyn FormatParser>, LoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("ron") => Ok(Box::new(RonFormatParser::new())),
        other => Err(LoadError::UnsupportedFormat(
            other.unwrap_or("<none>").to_owned(),
        )),
    }
}

/// Reads and validates a tile catalog from `path`.
pub fn load_from_file(path: &Path) -> Result<TileCatalog, LoadError> {
    let parser = parser_for_path(path)?;
    debug!(
        "Loading catalog from {} as {}",
        path.display(),
        parser.format_name()
    );
    let content = fs::read_to_string(path)?;
    let catalog = parser.parse(&content)?;
    info!(
        "Loaded {} tiles from {}",
        catalog.tiles.len(),
        path.display()
    );
    Ok(catalog)
}
