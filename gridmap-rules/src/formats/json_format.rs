use crate::formats::{FormatParser, RuleFile};
use crate::{LoadError, TileCatalog};

/// A parser implementation for JSON format rules.
///
/// Uses the same layout as the RON format:
/// `{"tiles": [{"type_id": "grass", "weight": 1.0, "right": ["sand"]}]}`.
#[derive(Debug, Default)]
pub struct JsonFormatParser;

impl JsonFormatParser {
    /// Creates a new JSON format parser
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for JsonFormatParser {
    fn format_name(&self) -> &'static str {
        "JSON"
    }

    fn parse(&self, content: &str) -> Result<TileCatalog, LoadError> {
        let rule_file: RuleFile = serde_json::from_str(content)
            .map_err(|e| LoadError::ParseError(format!("JSON deserialization failed: {e}")))?;
        rule_file.into_catalog()
    }
}
