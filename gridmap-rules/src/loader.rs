use crate::formats::{FormatParser, JsonFormatParser, RonFormatParser};
use crate::{LoadError, TileCatalog};
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Picks a parser from the file extension (`.ron` or `.json`, case-insensitive).
///
/// # Errors
///
/// Returns `LoadError::UnsupportedFormat` for any other extension.
pub fn parser_for_path(path: &Path) -> Result<Box<dyn FormatParser>, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("ron") => Ok(Box::new(RonFormatParser::new())),
        Some("json") => Ok(Box::new(JsonFormatParser::new())),
        _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Loads a tile catalog from a rule file.
///
/// # Arguments
///
/// * `path` - The path to the rule definition file (a RON or JSON file).
///
/// # Returns
///
/// The validated `TileCatalog` on success, or a `LoadError` on failure.
pub fn load_from_file(path: &Path) -> Result<TileCatalog, LoadError> {
    let parser = parser_for_path(path)?;
    debug!("Reading {} rules from {:?}", parser.format_name(), path);
    let content = fs::read_to_string(path)?;
    let catalog = parser.parse(&content)?;
    info!(
        "Loaded {} tile rules from {:?} (joker: {})",
        catalog.len(),
        path,
        catalog.joker().map_or("none", |j| j.type_id.as_str())
    );
    Ok(catalog)
}
