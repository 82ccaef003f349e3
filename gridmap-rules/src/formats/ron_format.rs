use crate::formats::{FormatParser, RuleFile};
use crate::{LoadError, TileCatalog};
use ron::extensions::Extensions;
use ron::Options;

/// A parser implementation for RON (Rusty Object Notation) format rules.
///
/// Optional direction lists may be written bare (`left: ["a"]`) rather than
/// wrapped in `Some(...)`.
pub struct RonFormatParser;

impl Default for RonFormatParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RonFormatParser {
    /// Creates a new RON format parser
    pub fn new() -> Self {
        Self
    }
}

impl FormatParser for RonFormatParser {
    fn format_name(&self) -> &'static str {
        "Rusty Object Notation (RON)"
    }

    fn parse(&self, ron_content: &str) -> Result<TileCatalog, LoadError> {
        let rule_file: RuleFile = Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(ron_content)
            .map_err(|e| LoadError::ParseError(format!("RON deserialization failed: {e}")))?;
        rule_file.into_catalog()
    }
}

/// Parses a tile catalog from a RON string.
pub fn parse_ron_rules(ron_content: &str) -> Result<TileCatalog, LoadError> {
    RonFormatParser::new().parse(ron_content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Direction;

    #[test]
    fn test_parse_directional_and_shared_lists() {
        let content = r#"
            (
                tiles: [
                    (type_id: "grass", weight: 2.0, neighbors: ["grass", "sand"]),
                    (type_id: "sand", right: ["water"], neighbors: ["grass"]),
                    (type_id: "water"),
                    (type_id: "rubble", joker: true, weight: 0.0),
                ],
            )
        "#;
        let catalog = parse_ron_rules(content).unwrap();
        assert_eq!(catalog.len(), 4);

        let grass = catalog.rule(0);
        assert!((grass.weight - 2.0).abs() < f32::EPSILON);
        assert_eq!(grass.allowed_neighbors(Direction::Backward), ["grass", "sand"]);

        let sand = catalog.rule(1);
        assert!((sand.weight - 1.0).abs() < f32::EPSILON);
        assert_eq!(sand.allowed_neighbors(Direction::Right), ["water"]);
        assert_eq!(sand.allowed_neighbors(Direction::Left), ["grass"]);

        assert!(catalog.rule(2).allowed_neighbors(Direction::Forward).is_empty());
        assert_eq!(catalog.joker_index(), Some(3));
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let result = parse_ron_rules(r#"(tiles: [(type_id: "a", colour: "red")])"#);
        assert!(matches!(result, Err(LoadError::ParseError(_))));
    }
}
