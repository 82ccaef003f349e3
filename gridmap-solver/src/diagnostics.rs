//! Contradiction reports.
//!
//! A report captures enough of the candidate store at the moment of failure
//! to understand a contradiction without re-running the solve: the emptied
//! cell, what emptied it, and the one-hop neighborhood around both the cell
//! that was just fixed and the cell that ran dry.

use gridmap_rules::Direction;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where in an attempt the contradiction surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ContradictionKind {
    /// A cell started the attempt with no candidates at all.
    Initial,
    /// Propagation from a fixed cell removed a neighbor's last candidate.
    Propagation,
}

/// State of a single cell inside a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SnapshotState {
    Decided(String),
    Undecided(Vec<String>),
}

/// One cell of a neighborhood snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellSnapshot {
    pub x: usize,
    pub y: usize,
    /// Direction from the snapshot center, `None` for the center itself.
    pub direction: Option<Direction>,
    pub usage_blocked: bool,
    pub state: SnapshotState,
}

/// A cell and its in-bounds lateral neighbors, center first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NeighborhoodSnapshot {
    pub cells: Vec<CellSnapshot>,
}

/// Structured description of a contradiction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContradictionReport {
    /// Zero-based attempt index.
    pub attempt: usize,
    /// Seed the attempt ran with.
    pub seed: u64,
    pub kind: ContradictionKind,
    /// Coordinates of the cell left without candidates.
    pub x: usize,
    pub y: usize,
    pub usage_blocked: bool,
    /// Coordinates of the cell whose choice triggered the removal.
    pub source: Option<(usize, usize)>,
    /// Type id chosen at `source`.
    pub trigger_type_id: Option<String>,
    /// Direction from `source` to the emptied cell.
    pub direction: Option<Direction>,
    pub candidates_before: Vec<String>,
    pub candidates_after: Vec<String>,
    pub source_neighborhood: Option<NeighborhoodSnapshot>,
    pub cell_neighborhood: NeighborhoodSnapshot,
}

impl ContradictionReport {
    /// Report for a cell whose initial candidate set was already empty.
    pub fn initial(
        (x, y): (usize, usize),
        usage_blocked: bool,
        cell_neighborhood: NeighborhoodSnapshot,
    ) -> Self {
        Self {
            attempt: 0,
            seed: 0,
            kind: ContradictionKind::Initial,
            x,
            y,
            usage_blocked,
            source: None,
            trigger_type_id: None,
            direction: None,
            candidates_before: Vec::new(),
            candidates_after: Vec::new(),
            source_neighborhood: None,
            cell_neighborhood,
        }
    }

    /// Stamps the attempt index and seed.
    #[must_use]
    pub fn for_attempt(mut self, attempt: usize, seed: u64) -> Self {
        self.attempt = attempt;
        self.seed = seed;
        self
    }
}

impl fmt::Display for ContradictionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell ({}, {})", self.x, self.y)?;
        if self.usage_blocked {
            f.write_str(" [blocked]")?;
        }
        match (self.kind, &self.trigger_type_id, self.source, self.direction) {
            (ContradictionKind::Propagation, Some(trigger), Some((sx, sy)), Some(direction)) => {
                write!(
                    f,
                    " lost all candidates after '{trigger}' was placed at ({sx}, {sy}) on its {} side; before: [{}]",
                    direction.opposite(),
                    self.candidates_before.join(", ")
                )?;
            }
            _ => f.write_str(" has no initial candidates")?,
        }
        write!(f, " (attempt {}, seed {})", self.attempt, self.seed)
    }
}
