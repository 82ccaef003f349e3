use crate::candidates::{candidate_ids, CandidateStore, CellState};
use crate::diagnostics::{ContradictionKind, ContradictionReport};
use gridmap_rules::{Direction, TileCatalog};
use log::{debug, info};
use std::fmt::Debug;
use thiserror::Error;

/// Errors that can occur during the constraint propagation phase.
#[derive(Debug, Error)]
pub enum PropagationError {
    /// A neighbor lost its last candidate and no joker was available.
    #[error("Contradiction detected during propagation: {0}")]
    Contradiction(Box<ContradictionReport>),
    /// Propagation was requested from a cell that has not been decided.
    #[error("Cannot propagate from undecided cell ({0}, {1})")]
    NotDecided(usize, usize),
}

/// Trait defining the interface for a constraint propagation algorithm.
///
/// Implementors filter the candidate sets around a freshly decided cell so
/// that every remaining candidate is compatible with the decision.
pub trait ConstraintPropagator: Debug {
    /// Propagates the decision at `index` to its neighbors.
    ///
    /// # Returns
    ///
    /// * `Ok(n)` with the number of joker substitutions performed.
    /// * `Err(PropagationError)` on an unrecoverable contradiction. The store
    ///   is left as it was when the contradiction was found.
    fn propagate(
        &self,
        store: &mut CandidateStore,
        catalog: &TileCatalog,
        index: usize,
    ) -> Result<usize, PropagationError>;
}

/// One-hop propagator over the four lateral neighbors.
///
/// A neighbor candidate `c` survives a decision `r` in direction `d` only if
/// `r` allows `c` on side `d` and `c` allows `r` on the opposite side.
/// Decided neighbors are never touched.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyPropagator {
    verbose: bool,
}

impl AdjacencyPropagator {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ConstraintPropagator for AdjacencyPropagator {
    fn propagate(
        &self,
        store: &mut CandidateStore,
        catalog: &TileCatalog,
        index: usize,
    ) -> Result<usize, PropagationError> {
        let Some(decided) = store.state(index).and_then(CellState::decided) else {
            let (x, y) = store.coords(index);
            return Err(PropagationError::NotDecided(x, y));
        };
        let rule = catalog.rule(decided);
        let joker = catalog.joker_index();
        let source = store.coords(index);
        let mut substitutions = 0;

        for direction in Direction::ALL {
            let Some(neighbor) = store.neighbor(index, direction) else {
                continue;
            };
            let Some(set) = store.candidates_mut(neighbor) else {
                continue;
            };

            let before = set.clone();
            for candidate in before.iter_ones() {
                if !rule.is_compatible_with(catalog.rule(candidate), direction) {
                    set.set(candidate, false);
                }
            }
            if set.count_ones() == before.count_ones() {
                continue;
            }

            let emptied = set.not_any();
            if emptied {
                if let Some(joker) = joker {
                    set.set(joker, true);
                    substitutions += 1;
                }
            }
            let after = set.clone();

            if self.verbose {
                let (nx, ny) = store.coords(neighbor);
                info!(
                    "'{}' at ({}, {}) narrowed {} neighbor ({}, {}): {:?} -> {:?}",
                    rule.type_id,
                    source.0,
                    source.1,
                    direction,
                    nx,
                    ny,
                    candidate_ids(&before, catalog),
                    candidate_ids(&after, catalog)
                );
            }

            if emptied && joker.is_none() {
                let (x, y) = store.coords(neighbor);
                debug!("Neighbor ({x}, {y}) emptied by '{}' with no joker", rule.type_id);
                return Err(PropagationError::Contradiction(Box::new(ContradictionReport {
                    attempt: 0,
                    seed: 0,
                    kind: ContradictionKind::Propagation,
                    x,
                    y,
                    usage_blocked: store.is_blocked(neighbor),
                    source: Some(source),
                    trigger_type_id: Some(rule.type_id.clone()),
                    direction: Some(direction),
                    candidates_before: candidate_ids(&before, catalog),
                    candidates_after: Vec::new(),
                    source_neighborhood: Some(store.neighborhood(index, catalog)),
                    cell_neighborhood: store.neighborhood(neighbor, catalog),
                })));
            }
        }

        Ok(substitutions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::SnapshotState;
    use bitvec::prelude::*;
    use gridmap_rules::TileRule;

    fn all(len: usize) -> CellState {
        CellState::Undecided(bitvec![1; len])
    }

    fn row(states: Vec<CellState>) -> CandidateStore {
        let len = states.len();
        CandidateStore::from_states(len, 1, states, bitvec![0; len]).unwrap()
    }

    fn ids(store: &CandidateStore, index: usize, catalog: &TileCatalog) -> Vec<String> {
        candidate_ids(store.state(index).and_then(CellState::candidates).unwrap(), catalog)
    }

    #[test]
    fn test_filters_both_directions() {
        // "sea" only tolerates "sand" or "sea" to its left; "rock" refuses "sea" to its left.
        let catalog = TileCatalog::new(vec![
            TileRule::new("sea", 1.0).with_allowed(Direction::Left, ["sand", "sea"]),
            TileRule::new("sand", 1.0),
            TileRule::new("rock", 1.0).with_allowed(Direction::Left, ["rock", "sand"]),
        ])
        .unwrap();
        let mut store = row(vec![all(3), CellState::Decided(0), all(3)]);

        let subs = AdjacencyPropagator::new(false)
            .propagate(&mut store, &catalog, 1)
            .unwrap();
        assert_eq!(subs, 0);
        assert_eq!(ids(&store, 0, &catalog), ["sea", "sand"]);
        // Right of the sea every tile is fine from the sea's side, but rock objects.
        assert_eq!(ids(&store, 2, &catalog), ["sea", "sand"]);
    }

    #[test]
    fn test_decided_neighbors_untouched() {
        let catalog = TileCatalog::new(vec![
            TileRule::new("a", 1.0).with_allowed_all(["a"]),
            TileRule::new("b", 1.0).with_allowed_all(["b"]),
        ])
        .unwrap();
        let mut store = row(vec![CellState::Decided(1), CellState::Decided(0)]);
        AdjacencyPropagator::default()
            .propagate(&mut store, &catalog, 1)
            .unwrap();
        assert_eq!(store.state(0), Some(&CellState::Decided(1)));
    }

    #[test]
    fn test_joker_substitution() {
        let catalog = TileCatalog::new(vec![
            TileRule::new("a", 1.0).with_allowed_all(["a"]),
            TileRule::new("b", 1.0).with_allowed_all(["b"]),
            TileRule::joker("j"),
        ])
        .unwrap();
        let mut store = row(vec![
            CellState::Decided(0),
            CellState::Undecided(bitvec![0, 1, 0]),
        ]);
        let subs = AdjacencyPropagator::new(true)
            .propagate(&mut store, &catalog, 0)
            .unwrap();
        assert_eq!(subs, 1);
        assert_eq!(ids(&store, 1, &catalog), ["j"]);
    }

    #[test]
    fn test_contradiction_stops_early() {
        let catalog = TileCatalog::new(vec![
            TileRule::new("a", 1.0).with_allowed_all(["a"]),
            TileRule::new("b", 1.0).with_allowed_all(["b"]),
        ])
        .unwrap();
        let mut store = row(vec![
            CellState::Undecided(bitvec![0, 1]),
            CellState::Decided(0),
            all(2),
        ]);
        let err = AdjacencyPropagator::new(false)
            .propagate(&mut store, &catalog, 1)
            .unwrap_err();

        let report = match err {
            PropagationError::Contradiction(report) => report,
            other => panic!("expected a contradiction, got {other:?}"),
        };
        assert_eq!((report.x, report.y), (0, 0));
        assert_eq!(report.kind, ContradictionKind::Propagation);
        assert_eq!(report.source, Some((1, 0)));
        assert_eq!(report.trigger_type_id.as_deref(), Some("a"));
        assert_eq!(report.direction, Some(Direction::Left));
        assert_eq!(report.candidates_before, ["b"]);
        assert!(report.candidates_after.is_empty());
        let source = report.source_neighborhood.as_ref().unwrap();
        assert_eq!(source.cells[0].state, SnapshotState::Decided("a".to_owned()));
        assert_eq!(report.cell_neighborhood.cells[0].state, SnapshotState::Undecided(vec![]));
        // The right neighbor comes after the failing left one and stays untouched.
        assert_eq!(ids(&store, 2, &catalog), ["a", "b"]);
    }

    #[test]
    fn test_undecided_source_is_rejected() {
        let catalog = TileCatalog::new(vec![TileRule::new("a", 1.0)]).unwrap();
        let mut store = row(vec![all(1), all(1)]);
        assert!(matches!(
            AdjacencyPropagator::default().propagate(&mut store, &catalog, 1),
            Err(PropagationError::NotDecided(1, 0))
        ));
    }
}
