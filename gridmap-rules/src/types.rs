use log::warn;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// One of the four lateral directions a tile can have a neighbor in.
///
/// `Left`/`Right` move along x, `Backward`/`Forward` along y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    /// Towards `x - 1`.
    Left,
    /// Towards `x + 1`.
    Right,
    /// Towards `y + 1`.
    Forward,
    /// Towards `y - 1`.
    Backward,
}

impl Direction {
    /// All directions in neighbor visiting order.
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Backward, Self::Forward];

    /// The direction pointing back from the neighbor.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// Grid offset `(dx, dy)` of a step in this direction.
    #[must_use]
    pub const fn offset(self) -> (isize, isize) {
        match self {
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Forward => (0, 1),
            Self::Backward => (0, -1),
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
            Self::Forward => 2,
            Self::Backward => 3,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Forward => "forward",
            Self::Backward => "backward",
        };
        f.write_str(name)
    }
}

/// Static description of a single tile type.
#[derive(Debug, Clone, PartialEq)]
pub struct TileRule {
    /// Unique, non-blank identifier written into the grid.
    pub type_id: String,
    /// Relative selection weight. Zero or less disables normal selection.
    pub weight: f32,
    /// Fallback tile used to resolve contradictions, never picked normally.
    pub is_joker: bool,
    /// Allowed neighbor ids, indexed by `Direction::slot`. Empty means unrestricted.
    allowed_neighbors: [Vec<String>; 4],
}

impl TileRule {
    /// Creates an unrestricted, non-joker rule.
    pub fn new(type_id: impl Into<String>, weight: f32) -> Self {
        Self {
            type_id: type_id.into(),
            weight,
            is_joker: false,
            allowed_neighbors: Default::default(),
        }
    }

    /// Creates an unrestricted joker rule with zero weight.
    pub fn joker(type_id: impl Into<String>) -> Self {
        Self {
            is_joker: true,
            ..Self::new(type_id, 0.0)
        }
    }

    /// Marks or unmarks this rule as the joker.
    #[must_use]
    pub fn with_joker(mut self, is_joker: bool) -> Self {
        self.is_joker = is_joker;
        self
    }

    /// Replaces the allow-list for one direction.
    #[must_use]
    pub fn with_allowed<I, S>(mut self, direction: Direction, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_neighbors[direction.slot()] = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the allow-lists of all four directions with the same ids.
    #[must_use]
    pub fn with_allowed_all<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        for direction in Direction::ALL {
            self.allowed_neighbors[direction.slot()].clone_from(&ids);
        }
        self
    }

    /// The allow-list for `direction`, in declaration order.
    pub fn allowed_neighbors(&self, direction: Direction) -> &[String] {
        &self.allowed_neighbors[direction.slot()]
    }

    /// Whether a neighbor of type `neighbor_id` may sit in `direction` of this tile.
    ///
    /// Blank ids are never allowed; an empty allow-list allows everything else.
    pub fn allows(&self, neighbor_id: &str, direction: Direction) -> bool {
        if neighbor_id.trim().is_empty() {
            return false;
        }
        let allowed = self.allowed_neighbors(direction);
        allowed.is_empty() || allowed.iter().any(|id| id == neighbor_id)
    }

    /// Bidirectional compatibility: `other` placed in `direction` of `self`.
    pub fn is_compatible_with(&self, other: &Self, direction: Direction) -> bool {
        self.allows(&other.type_id, direction) && other.allows(&self.type_id, direction.opposite())
    }

    /// Whether the rule takes part in normal weighted selection.
    pub fn is_selectable(&self) -> bool {
        !self.is_joker && self.weight > 0.0
    }
}

/// Errors raised when assembling a `TileCatalog`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A rule at the given position has an empty or whitespace-only id.
    #[error("Tile at index {0} has a blank type id")]
    BlankTypeId(usize),
    /// Two rules share the same id.
    #[error("Duplicate tile type id: {0}")]
    DuplicateTypeId(String),
    /// A weight was negative, NaN or infinite.
    #[error("Tile '{type_id}' has an invalid weight: {weight}")]
    InvalidWeight { type_id: String, weight: String },
}

/// An allow-list entry naming a type id the catalog does not define.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownReference {
    pub type_id: String,
    pub direction: Direction,
    pub missing: String,
}

/// Ordered, validated collection of tile rules.
///
/// Catalog order is significant: it is the order candidates are stored and
/// sampled in, and the first rule flagged as joker is the catalog's joker.
#[derive(Debug, Clone, Default)]
pub struct TileCatalog {
    rules: Vec<TileRule>,
    index: HashMap<String, usize>,
    joker: Option<usize>,
}

impl TileCatalog {
    /// Builds a catalog, validating ids and weights.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::BlankTypeId` for blank ids,
    /// `CatalogError::DuplicateTypeId` for repeated ids and
    /// `CatalogError::InvalidWeight` for negative or non-finite weights.
    pub fn new(rules: Vec<TileRule>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(rules.len());
        for (position, rule) in rules.iter().enumerate() {
            if rule.type_id.trim().is_empty() {
                return Err(CatalogError::BlankTypeId(position));
            }
            if !rule.weight.is_finite() || rule.weight < 0.0 {
                return Err(CatalogError::InvalidWeight {
                    type_id: rule.type_id.clone(),
                    weight: rule.weight.to_string(),
                });
            }
            if index.insert(rule.type_id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateTypeId(rule.type_id.clone()));
            }
        }

        let mut jokers = rules.iter().enumerate().filter(|(_, r)| r.is_joker);
        let joker = jokers.next().map(|(i, _)| i);
        let extra: Vec<&str> = jokers.map(|(_, r)| r.type_id.as_str()).collect();
        if !extra.is_empty() {
            warn!(
                "Catalog marks several jokers; using '{}' and ignoring {:?}",
                rules[joker.unwrap_or_default()].type_id,
                extra
            );
        }

        let catalog = Self {
            rules,
            index,
            joker,
        };
        for unknown in catalog.unknown_references() {
            warn!(
                "Tile '{}' allows unknown neighbor '{}' to the {}",
                unknown.type_id, unknown.missing, unknown.direction
            );
        }
        Ok(catalog)
    }

    /// All rules in catalog order.
    pub fn rules(&self) -> &[TileRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the catalog has no rules at all.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rule at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&TileRule> {
        self.rules.get(index)
    }

    /// The rule at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn rule(&self, index: usize) -> &TileRule {
        &self.rules[index]
    }

    /// Catalog position of `type_id`.
    pub fn index_of(&self, type_id: &str) -> Option<usize> {
        self.index.get(type_id).copied()
    }

    /// Catalog position of the joker, the first rule flagged as one.
    pub fn joker_index(&self) -> Option<usize> {
        self.joker
    }

    /// The joker rule, if the catalog has one.
    pub fn joker(&self) -> Option<&TileRule> {
        self.joker.map(|i| &self.rules[i])
    }

    /// Positions of the rules eligible for normal weighted selection.
    pub fn selectable_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.is_selectable())
            .map(|(i, _)| i)
    }

    /// Allow-list entries that name ids missing from this catalog.
    pub fn unknown_references(&self) -> Vec<UnknownReference> {
        let mut unknown = Vec::new();
        for rule in &self.rules {
            for direction in Direction::ALL {
                for id in rule.allowed_neighbors(direction) {
                    if !self.index.contains_key(id) {
                        unknown.push(UnknownReference {
                            type_id: rule.type_id.clone(),
                            direction,
                            missing: id.clone(),
                        });
                    }
                }
            }
        }
        unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_ne!(direction.opposite(), direction);
            let (dx, dy) = direction.offset();
            let (ox, oy) = direction.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn test_empty_list_allows_everything_but_blank() {
        let rule = TileRule::new("grass", 1.0);
        assert!(rule.allows("anything", Direction::Left));
        assert!(!rule.allows("", Direction::Left));
        assert!(!rule.allows("   ", Direction::Forward));
    }

    #[test]
    fn test_allow_list_is_per_direction() {
        let rule = TileRule::new("shore", 1.0).with_allowed(Direction::Right, ["water"]);
        assert!(rule.allows("water", Direction::Right));
        assert!(!rule.allows("grass", Direction::Right));
        assert!(rule.allows("grass", Direction::Left));
    }

    #[test]
    fn test_compatibility_checks_both_sides() {
        let shore = TileRule::new("shore", 1.0).with_allowed(Direction::Right, ["water"]);
        let water = TileRule::new("water", 1.0).with_allowed(Direction::Left, ["sand"]);
        // shore allows water on its right, but water refuses shore on its left.
        assert!(!shore.is_compatible_with(&water, Direction::Right));
        let water = water.with_allowed(Direction::Left, ["shore"]);
        assert!(shore.is_compatible_with(&water, Direction::Right));
        assert!(water.is_compatible_with(&shore, Direction::Left));
    }

    #[test]
    fn test_selectable_requires_positive_weight() {
        assert!(TileRule::new("a", 0.5).is_selectable());
        assert!(!TileRule::new("a", 0.0).is_selectable());
        assert!(!TileRule::joker("j").is_selectable());
        assert!(!TileRule::new("j", 3.0).with_joker(true).is_selectable());
    }

    #[test]
    fn test_catalog_rejects_duplicates_and_blanks() {
        let dup = TileCatalog::new(vec![TileRule::new("a", 1.0), TileRule::new("a", 2.0)]);
        assert_eq!(dup.err(), Some(CatalogError::DuplicateTypeId("a".to_owned())));

        let blank = TileCatalog::new(vec![TileRule::new("a", 1.0), TileRule::new(" ", 1.0)]);
        assert_eq!(blank.err(), Some(CatalogError::BlankTypeId(1)));

        let negative = TileCatalog::new(vec![TileRule::new("a", -1.0)]);
        assert!(matches!(negative, Err(CatalogError::InvalidWeight { .. })));
    }

    #[test]
    fn test_first_joker_wins() {
        let catalog = TileCatalog::new(vec![
            TileRule::new("a", 1.0),
            TileRule::joker("j1"),
            TileRule::joker("j2"),
        ])
        .unwrap();
        assert_eq!(catalog.joker_index(), Some(1));
        assert_eq!(catalog.joker().map(|j| j.type_id.as_str()), Some("j1"));
        assert_eq!(catalog.selectable_indices().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_unknown_references_are_reported() {
        let catalog = TileCatalog::new(vec![
            TileRule::new("a", 1.0).with_allowed(Direction::Forward, ["a", "ghost"]),
        ])
        .unwrap();
        let unknown = catalog.unknown_references();
        assert_eq!(unknown.len(), 1);
        assert_eq!(unknown[0].missing, "ghost");
        assert_eq!(unknown[0].direction, Direction::Forward);
    }
}
