//! Core library for the constrained tile-collapse solver.
//! Fills a 2D grid with tile type ids so that every adjacent pair satisfies
//! the direction-specific allow-lists of a `TileCatalog`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-cell candidate sets and their initialization.
pub mod candidates;
/// Weighted selection of a single rule from a candidate set.
pub mod collapse;
/// Structured contradiction reports.
pub mod diagnostics;
/// Lowest-entropy cell selection.
pub mod entropy;
/// Generic 2D grids and the host grid interface.
pub mod grid;
/// Constraint propagation logic and traits.
pub mod propagator;
/// Attempt loop, retries and configuration.
pub mod runner;

pub use crate::candidates::{CandidatePools, CandidateStore, CellState};
pub use crate::diagnostics::{ContradictionKind, ContradictionReport};
pub use crate::entropy::{EntropySelector, LowestCountSelector, Selection};
pub use crate::grid::{Cell, CellGrid, Grid, TileGrid};
pub use crate::propagator::{AdjacencyPropagator, ConstraintPropagator, PropagationError};
pub use crate::runner::{solve, solve_with, WfcConfig, WfcConfigBuilder};
pub use gridmap_rules::{Direction, TileCatalog, TileRule};

/// Errors that end a solve.
///
/// Every variant is returned only after the grid has been restored to the
/// state it had before the call.
#[derive(Error, Debug)]
pub enum WfcError {
    /// The catalog has neither a selectable rule nor a joker.
    #[error("Tile catalog has no usable tiles (no positive-weight rule and no joker)")]
    EmptyCatalog,
    /// An attempt hit a contradiction and retries are disabled.
    #[error("Contradiction: {0}")]
    Contradiction(Box<ContradictionReport>),
    /// Every allowed attempt hit a contradiction. Carries the last one.
    #[error("All {attempts} attempts failed; last contradiction: {report}")]
    RetriesExhausted {
        attempts: usize,
        report: Box<ContradictionReport>,
    },
    /// The grid cannot be solved as given (e.g. zero cells).
    #[error("Grid error: {0}")]
    GridError(String),
}

impl WfcError {
    /// The contradiction behind this error, if it was caused by one.
    pub fn report(&self) -> Option<&ContradictionReport> {
        match self {
            Self::Contradiction(report) | Self::RetriesExhausted { report, .. } => Some(&**report),
            Self::EmptyCatalog | Self::GridError(_) => None,
        }
    }
}

/// Which side of the usage-blocked partition a pool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Partition {
    Blocked,
    Unblocked,
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Blocked => "blocked",
            Self::Unblocked => "unblocked",
        })
    }
}

/// Non-fatal conditions noticed while setting up a solve.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SolveWarning {
    /// Partitioning left no selectable rule for one kind of cell.
    #[error("No candidates remain for {partition} cells after partitioning")]
    NoPartitionedCandidates { partition: Partition },
}

/// Summary of a successful solve.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveOutcome {
    /// Attempts made, including the successful one.
    pub attempts: usize,
    /// Seed of the successful attempt.
    pub seed: u64,
    /// Number of substitution events: each time a candidate set was emptied
    /// and replaced by the joker. A cell already holding only the joker that is
    /// emptied again counts again, so this can exceed the number of joker cells.
    pub joker_substitutions: usize,
    /// Warnings raised during setup.
    pub warnings: Vec<SolveWarning>,
}
