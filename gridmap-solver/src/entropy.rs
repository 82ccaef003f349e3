use crate::candidates::{CandidateStore, CellState};
use rayon::prelude::*;

/// What the selector wants the runner to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Draw a rule for this cell; it has two or more candidates.
    Collapse(usize),
    /// Apply the only candidate of this cell.
    Settle(usize),
    /// Every cell is decided.
    Done,
    /// This undecided cell has no candidates.
    Contradiction(usize),
}

/// Strategy for picking the next cell to decide.
pub trait EntropySelector {
    #[must_use]
    fn select(&self, store: &CandidateStore) -> Selection;
}

/// Picks the undecided cell with the fewest candidates, ties going to the
/// lowest row-major index.
///
/// Singletons are settled lazily: a cell with exactly one candidate is only
/// returned once no cell with two or more candidates is left, so multi-way
/// choices are always made first. Entropy here is the plain candidate count.
///
/// The cost is that a narrowed cell is never settled early. On catalogs
/// whose tiles only accept themselves, two neighbors collapsed in the same
/// round can pick different tiles and leave the cell between them empty,
/// even when a uniform grid would be valid. With a joker that cell is filled
/// with the joker; without one the attempt contradicts.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowestCountSelector;

impl LowestCountSelector {
    pub const fn new() -> Self {
        Self
    }
}

fn candidate_count(state: &CellState) -> Option<usize> {
    state.candidates().map(|set| set.count_ones())
}

impl EntropySelector for LowestCountSelector {
    fn select(&self, store: &CandidateStore) -> Selection {
        let states = store.states();

        if let Some(index) = states
            .par_iter()
            .position_first(|state| candidate_count(state) == Some(0))
        {
            return Selection::Contradiction(index);
        }

        // (count, index) is unique per cell, so the parallel minimum is deterministic.
        let lowest = states
            .par_iter()
            .enumerate()
            .filter_map(|(index, state)| {
                candidate_count(state)
                    .filter(|&count| count >= 2)
                    .map(|count| (count, index))
            })
            .min();
        if let Some((_, index)) = lowest {
            return Selection::Collapse(index);
        }

        states
            .par_iter()
            .position_first(|state| candidate_count(state) == Some(1))
            .map_or(Selection::Done, Selection::Settle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitvec::prelude::*;

    fn store(states: Vec<CellState>, width: usize) -> CandidateStore {
        let len = states.len();
        CandidateStore::from_states(width, len / width, states, bitvec![0; len]).unwrap()
    }

    fn undecided(bits: &[u8]) -> CellState {
        CellState::Undecided(bits.iter().map(|&b| b == 1).collect())
    }

    #[test]
    fn test_lowest_count_wins() {
        let store = store(
            vec![undecided(&[1, 1, 1]), undecided(&[1, 1, 0]), undecided(&[1, 1, 1])],
            3,
        );
        assert_eq!(LowestCountSelector.select(&store), Selection::Collapse(1));
    }

    #[test]
    fn test_ties_go_to_first_row_major_index() {
        let store = store(
            vec![
                undecided(&[1, 1, 1]),
                undecided(&[0, 1, 1]),
                undecided(&[1, 0, 1]),
                undecided(&[1, 1, 0]),
            ],
            2,
        );
        assert_eq!(LowestCountSelector.select(&store), Selection::Collapse(1));
    }

    #[test]
    fn test_singletons_wait_for_multi_candidate_cells() {
        let store = store(
            vec![undecided(&[0, 1, 0]), undecided(&[1, 1, 1]), CellState::Decided(0)],
            3,
        );
        assert_eq!(LowestCountSelector.select(&store), Selection::Collapse(1));

        let store = store_after_collapse();
        assert_eq!(LowestCountSelector.select(&store), Selection::Settle(1));
    }

    fn store_after_collapse() -> CandidateStore {
        store(
            vec![CellState::Decided(1), undecided(&[0, 0, 1]), undecided(&[1, 0, 0])],
            3,
        )
    }

    #[test]
    fn test_contradiction_takes_priority() {
        let store = store(
            vec![undecided(&[1, 1]), undecided(&[0, 0]), undecided(&[1, 0])],
            3,
        );
        assert_eq!(LowestCountSelector.select(&store), Selection::Contradiction(1));
    }

    #[test]
    fn test_done_when_everything_decided() {
        let store = store(vec![CellState::Decided(0), CellState::Decided(1)], 1);
        assert_eq!(LowestCountSelector.select(&store), Selection::Done);
    }
}
