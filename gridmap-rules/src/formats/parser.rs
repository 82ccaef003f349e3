use crate::{LoadError, TileCatalog};

/// Trait defining the interface for format-specific rule parsers.
///
/// Implementors of this trait parse tile catalogs from different file formats
/// (e.g., RON or JSON).
pub trait FormatParser {
    /// Parses rule content into a validated `TileCatalog`.
    ///
    /// # Arguments
    ///
    /// * `content` - A string slice containing the rule content
    ///
    /// # Returns
    ///
    /// * `Ok(TileCatalog)` - Successfully parsed rules
    /// * `Err(LoadError)` - Error encountered during parsing or validation
    fn parse(&self, content: &str) -> Result<TileCatalog, LoadError>;

    /// Returns a descriptive name for this parser format.
    ///
    /// This can be used for debugging, logging, or user-facing error messages.
    fn format_name(&self) -> &'static str;
}
