//! Module defining parsers for different rule file formats.

use crate::types::{Direction, TileCatalog, TileRule};
use crate::LoadError;
use serde::Deserialize;

// Export the core parser trait
pub mod parser;
pub use parser::FormatParser;

// Format-specific implementations
pub mod json_format;
pub mod ron_format;

pub use json_format::JsonFormatParser;
pub use ron_format::RonFormatParser;

fn default_weight() -> f32 {
    1.0
}

/// One tile entry as written in a rule file.
///
/// `neighbors` applies to every direction that has no list of its own.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct RuleFileTile {
    type_id: String,
    #[serde(default = "default_weight")]
    weight: f32,
    #[serde(default)]
    joker: bool,
    #[serde(default)]
    neighbors: Vec<String>,
    #[serde(default)]
    left: Option<Vec<String>>,
    #[serde(default)]
    right: Option<Vec<String>>,
    #[serde(default)]
    forward: Option<Vec<String>>,
    #[serde(default)]
    backward: Option<Vec<String>>,
}

impl RuleFileTile {
    fn into_rule(self) -> TileRule {
        let neighbors = self.neighbors;
        let mut rule = TileRule::new(self.type_id, self.weight).with_joker(self.joker);
        for (direction, list) in [
            (Direction::Left, self.left),
            (Direction::Right, self.right),
            (Direction::Forward, self.forward),
            (Direction::Backward, self.backward),
        ] {
            rule = rule.with_allowed(direction, list.unwrap_or_else(|| neighbors.clone()));
        }
        rule
    }
}

/// Top-level structure shared by every rule file format.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub(crate) struct RuleFile {
    tiles: Vec<RuleFileTile>,
}

impl RuleFile {
    /// Validates the parsed file and converts it into a catalog.
    pub(crate) fn into_catalog(self) -> Result<TileCatalog, LoadError> {
        if self.tiles.is_empty() {
            return Err(LoadError::InvalidData("No tiles defined.".to_owned()));
        }
        let rules = self.tiles.into_iter().map(RuleFileTile::into_rule).collect();
        Ok(TileCatalog::new(rules)?)
    }
}
