use crate::diagnostics::{CellSnapshot, NeighborhoodSnapshot, SnapshotState};
use crate::grid::{CellGrid, Grid};
use crate::runner::WfcConfig;
use crate::{Partition, SolveWarning, WfcError};
use bitvec::prelude::*;
use gridmap_rules::{Direction, TileCatalog};
use log::{info, warn};

/// Solver state of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellState {
    /// Still open. Bit `i` set means catalog rule `i` is admissible.
    Undecided(BitVec),
    /// Fixed to the catalog rule at this index.
    Decided(usize),
}

impl Default for CellState {
    fn default() -> Self {
        Self::Undecided(BitVec::new())
    }
}

impl CellState {
    /// The candidate set, or `None` once decided.
    pub fn candidates(&self) -> Option<&BitVec> {
        match self {
            Self::Undecided(set) => Some(set),
            Self::Decided(_) => None,
        }
    }

    /// The chosen rule, or `None` while undecided.
    pub const fn decided(&self) -> Option<usize> {
        match self {
            Self::Decided(rule) => Some(*rule),
            Self::Undecided(_) => None,
        }
    }
}

/// Type ids of the set bits, in catalog order.
pub fn candidate_ids(set: &BitSlice, catalog: &TileCatalog) -> Vec<String> {
    set.iter_ones()
        .map(|i| catalog.rule(i).type_id.clone())
        .collect()
}

/// The initial candidate pools, computed once per solve and shared by every cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePools {
    normal: BitVec,
    /// `(blocked, unblocked)` pools when usage partitioning is on.
    partitioned: Option<(BitVec, BitVec)>,
    joker: Option<usize>,
}

impl CandidatePools {
    /// Builds the pools for `catalog` under `config`.
    ///
    /// The normal pool holds every non-joker rule with positive weight. With
    /// `respect_usage_blocked` it is split by `blocked_type_ids` and
    /// `unblocked_type_ids`; an empty id set leaves its side unrestricted.
    ///
    /// # Errors
    ///
    /// Returns `WfcError::EmptyCatalog` if there is neither a selectable rule nor a joker.
    pub fn build(
        catalog: &TileCatalog,
        config: &WfcConfig,
    ) -> Result<(Self, Vec<SolveWarning>), WfcError> {
        let mut normal = bitvec![0; catalog.len()];
        for index in catalog.selectable_indices() {
            normal.set(index, true);
        }
        let joker = catalog.joker_index();
        if normal.not_any() && joker.is_none() {
            return Err(WfcError::EmptyCatalog);
        }

        let mut warnings = Vec::new();
        let partitioned = config.respect_usage_blocked.then(|| {
            let restrict = |ids: &std::collections::BTreeSet<String>| {
                let mut pool = normal.clone();
                if !ids.is_empty() {
                    for index in normal.iter_ones() {
                        if !ids.contains(&catalog.rule(index).type_id) {
                            pool.set(index, false);
                        }
                    }
                }
                pool
            };
            let blocked = restrict(&config.blocked_type_ids);
            let unblocked = restrict(&config.unblocked_type_ids);
            for (pool, partition) in [(&blocked, Partition::Blocked), (&unblocked, Partition::Unblocked)] {
                if pool.not_any() {
                    warn!("No selectable tiles left for {partition} cells; they fall back to the joker");
                    warnings.push(SolveWarning::NoPartitionedCandidates { partition });
                }
            }
            if config.verbose_logging {
                info!(
                    "Candidate pools: blocked {:?}, unblocked {:?}",
                    candidate_ids(&blocked, catalog),
                    candidate_ids(&unblocked, catalog)
                );
            }
            (blocked, unblocked)
        });

        if partitioned.is_none() && config.verbose_logging {
            info!("Candidate pool: {:?}", candidate_ids(&normal, catalog));
        }

        Ok((
            Self {
                normal,
                partitioned,
                joker,
            },
            warnings,
        ))
    }

    /// Initial candidate set for a cell with the given blocked flag.
    ///
    /// An empty pool falls back to `{joker}`, or stays empty without one.
    pub fn initial_for(&self, usage_blocked: bool) -> BitVec {
        let pool = match &self.partitioned {
            Some((blocked, _)) if usage_blocked => blocked,
            Some((_, unblocked)) => unblocked,
            None => &self.normal,
        };
        let mut set = pool.clone();
        if set.not_any() {
            if let Some(joker) = self.joker {
                set.set(joker, true);
            }
        }
        set
    }
}

/// Working state of one attempt: a `CellState` per grid cell plus the
/// blocked flags read from the host grid when the store was seeded.
#[derive(Debug, Clone)]
pub struct CandidateStore {
    cells: Grid<CellState>,
    blocked: BitVec,
}

impl CandidateStore {
    /// Seeds a fresh store for `grid` from `pools`.
    pub fn seed<G: CellGrid + ?Sized>(grid: &G, pools: &CandidatePools) -> Self {
        let (width, height) = (grid.width(), grid.height());
        let mut blocked = BitVec::with_capacity(width * height);
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let usage_blocked = grid.is_usage_blocked(x, y);
                blocked.push(usage_blocked);
                cells.push(CellState::Undecided(pools.initial_for(usage_blocked)));
            }
        }
        Self {
            cells: Grid {
                width,
                height,
                data: cells,
            },
            blocked,
        }
    }

    /// Builds a store directly from cell states, mainly for tests and tools.
    ///
    /// # Errors
    ///
    /// Returns `WfcError::GridError` if either vector does not match the dimensions.
    pub fn from_states(
        width: usize,
        height: usize,
        states: Vec<CellState>,
        blocked: BitVec,
    ) -> Result<Self, WfcError> {
        if blocked.len() != width * height {
            return Err(WfcError::GridError(format!(
                "blocked mask has {} entries for {} cells",
                blocked.len(),
                width * height
            )));
        }
        Ok(Self {
            cells: Grid::from_vec(width, height, states)?,
            blocked,
        })
    }

    pub const fn width(&self) -> usize {
        self.cells.width
    }

    pub const fn height(&self) -> usize {
        self.cells.height
    }

    /// All cell states in row-major order.
    pub fn states(&self) -> &[CellState] {
        self.cells.cells()
    }

    pub fn state(&self, index: usize) -> Option<&CellState> {
        self.cells.data.get(index)
    }

    /// Mutable candidate set of an undecided cell.
    pub fn candidates_mut(&mut self, index: usize) -> Option<&mut BitVec> {
        match self.cells.data.get_mut(index) {
            Some(CellState::Undecided(set)) => Some(set),
            _ => None,
        }
    }

    /// Fixes a cell to a catalog rule.
    pub fn decide(&mut self, index: usize, rule: usize) {
        if let Some(state) = self.cells.data.get_mut(index) {
            *state = CellState::Decided(rule);
        }
    }

    pub fn is_blocked(&self, index: usize) -> bool {
        self.blocked.get(index).is_some_and(|b| *b)
    }

    pub fn coords(&self, index: usize) -> (usize, usize) {
        self.cells.coords(index)
    }

    pub fn neighbor(&self, index: usize, direction: Direction) -> Option<usize> {
        self.cells.neighbor(index, direction)
    }

    /// Number of decided cells.
    pub fn decided_count(&self) -> usize {
        self.cells
            .data
            .iter()
            .filter(|s| matches!(s, CellState::Decided(_)))
            .count()
    }

    fn cell_snapshot(
        &self,
        index: usize,
        direction: Option<Direction>,
        catalog: &TileCatalog,
    ) -> CellSnapshot {
        let (x, y) = self.coords(index);
        let state = match &self.cells.data[index] {
            CellState::Decided(rule) => SnapshotState::Decided(catalog.rule(*rule).type_id.clone()),
            CellState::Undecided(set) => SnapshotState::Undecided(candidate_ids(set, catalog)),
        };
        CellSnapshot {
            x,
            y,
            direction,
            usage_blocked: self.is_blocked(index),
            state,
        }
    }

    /// The cell at `index` followed by its in-bounds neighbors.
    pub fn neighborhood(&self, index: usize, catalog: &TileCatalog) -> NeighborhoodSnapshot {
        let mut cells = vec![self.cell_snapshot(index, None, catalog)];
        for direction in Direction::ALL {
            if let Some(neighbor) = self.neighbor(index, direction) {
                cells.push(self.cell_snapshot(neighbor, Some(direction), catalog));
            }
        }
        NeighborhoodSnapshot { cells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileGrid;
    use gridmap_rules::TileRule;

    fn catalog() -> TileCatalog {
        TileCatalog::new(vec![
            TileRule::new("floor", 2.0),
            TileRule::new("wall", 1.0),
            TileRule::new("ghost", 0.0),
            TileRule::joker("rubble"),
        ])
        .unwrap()
    }

    fn ids(set: &BitVec, catalog: &TileCatalog) -> Vec<String> {
        candidate_ids(set, catalog)
    }

    #[test]
    fn test_normal_pool_skips_zero_weight_and_joker() {
        let catalog = catalog();
        let (pools, warnings) = CandidatePools::build(&catalog, &WfcConfig::default()).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(ids(&pools.initial_for(false), &catalog), ["floor", "wall"]);
        assert_eq!(ids(&pools.initial_for(true), &catalog), ["floor", "wall"]);
    }

    #[test]
    fn test_partitioned_pools() {
        let catalog = catalog();
        let config = WfcConfig::builder()
            .respect_usage_blocked(true)
            .blocked_type_ids(["wall"])
            .build();
        let (pools, warnings) = CandidatePools::build(&catalog, &config).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(ids(&pools.initial_for(true), &catalog), ["wall"]);
        // Empty unblocked id set leaves that side unrestricted.
        assert_eq!(ids(&pools.initial_for(false), &catalog), ["floor", "wall"]);
    }

    #[test]
    fn test_empty_partition_warns_and_falls_back_to_joker() {
        let catalog = catalog();
        let config = WfcConfig::builder()
            .respect_usage_blocked(true)
            .blocked_type_ids(["ghost"])
            .build();
        let (pools, warnings) = CandidatePools::build(&catalog, &config).unwrap();
        assert_eq!(
            warnings,
            vec![SolveWarning::NoPartitionedCandidates {
                partition: Partition::Blocked
            }]
        );
        assert_eq!(ids(&pools.initial_for(true), &catalog), ["rubble"]);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = TileCatalog::new(vec![TileRule::new("ghost", 0.0)]).unwrap();
        assert!(matches!(
            CandidatePools::build(&catalog, &WfcConfig::default()),
            Err(WfcError::EmptyCatalog)
        ));
        let empty = TileCatalog::new(Vec::new()).unwrap();
        assert!(matches!(
            CandidatePools::build(&empty, &WfcConfig::default()),
            Err(WfcError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_seed_reads_blocked_flags() {
        let catalog = catalog();
        let config = WfcConfig::builder()
            .respect_usage_blocked(true)
            .blocked_type_ids(["wall"])
            .unblocked_type_ids(["floor"])
            .build();
        let (pools, _) = CandidatePools::build(&catalog, &config).unwrap();
        let grid = TileGrid::from_blocked_mask(2, 1, &[true, false]).unwrap();
        let store = CandidateStore::seed(&grid, &pools);

        assert!(store.is_blocked(0));
        assert!(!store.is_blocked(1));
        let first = store.state(0).and_then(CellState::candidates).unwrap();
        assert_eq!(ids(first, &catalog), ["wall"]);
        let second = store.state(1).and_then(CellState::candidates).unwrap();
        assert_eq!(ids(second, &catalog), ["floor"]);
    }

    #[test]
    fn test_neighborhood_lists_center_first() {
        let catalog = catalog();
        let (pools, _) = CandidatePools::build(&catalog, &WfcConfig::default()).unwrap();
        let grid = TileGrid::new(3, 1);
        let mut store = CandidateStore::seed(&grid, &pools);
        store.decide(0, 1);

        let snapshot = store.neighborhood(1, &catalog);
        assert_eq!(snapshot.cells.len(), 3);
        assert_eq!((snapshot.cells[0].x, snapshot.cells[0].direction), (1, None));
        assert_eq!(snapshot.cells[1].direction, Some(Direction::Left));
        assert_eq!(
            snapshot.cells[1].state,
            SnapshotState::Decided("wall".to_owned())
        );
        assert_eq!(store.decided_count(), 1);
    }
}
