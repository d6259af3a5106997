//! The trait every catalog format implements.

use crate::catalog::TileCatalog;
use crate::LoadError;

/// Turns the text of a catalog file into a validated [`TileCatalog`].
pub trait FormatParser {
    /// Parses `content`. The returned catalog has passed
    /// [`TileCatalog::validate`].
    fn parse(&self, content: &str) -> Result<TileCatalog, LoadError>;

    /// Human readable name of the format, used in log and error messages.
    fn format_name(&self) -> &'static str;
}
