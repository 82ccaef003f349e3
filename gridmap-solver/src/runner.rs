use crate::candidates::{CandidatePools, CandidateStore, CellState};
use crate::collapse::collapse;
use crate::diagnostics::ContradictionReport;
use crate::entropy::{EntropySelector, LowestCountSelector, Selection};
use crate::grid::CellGrid;
use crate::propagator::{AdjacencyPropagator, ConstraintPropagator, PropagationError};
use crate::{SolveOutcome, WfcError};
use gridmap_rules::TileCatalog;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Configuration options for the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WfcConfig {
    /// Split the initial pool by each cell's usage-blocked flag.
    pub respect_usage_blocked: bool,
    /// Type ids eligible for blocked cells; empty means every selectable rule.
    pub blocked_type_ids: BTreeSet<String>,
    /// Type ids eligible for unblocked cells; empty means every selectable rule.
    pub unblocked_type_ids: BTreeSet<String>,
    pub restart_on_failure: bool,
    /// Extra attempts after the first one when `restart_on_failure` is set.
    pub max_retries: u32,
    /// Use `base_seed + attempt` instead of `base_seed` for each retry.
    pub use_new_seed_on_retry: bool,
    pub verbose_logging: bool,
    pub base_seed: u64,
}

impl WfcConfig {
    /// Creates a new builder for `WfcConfig`.
    pub fn builder() -> WfcConfigBuilder {
        WfcConfigBuilder::default()
    }

    /// Number of attempts a solve may make.
    pub fn max_attempts(&self) -> usize {
        if self.restart_on_failure {
            self.max_retries as usize + 1
        } else {
            1
        }
    }

    /// Seed used for the zero-based `attempt`.
    pub fn seed_for_attempt(&self, attempt: usize) -> u64 {
        if self.use_new_seed_on_retry {
            self.base_seed.wrapping_add(attempt as u64)
        } else {
            self.base_seed
        }
    }
}

impl Default for WfcConfig {
    fn default() -> Self {
        Self {
            respect_usage_blocked: false,
            blocked_type_ids: BTreeSet::new(),
            unblocked_type_ids: BTreeSet::new(),
            restart_on_failure: true,
            max_retries: 3,
            use_new_seed_on_retry: true,
            verbose_logging: false,
            base_seed: 0,
        }
    }
}

/// Builder for `WfcConfig`.
///
/// Allows for a more ergonomic construction of `WfcConfig` instances.
#[derive(Debug, Clone, Default)]
pub struct WfcConfigBuilder {
    config: WfcConfig,
}

impl WfcConfigBuilder {
    /// Enables or disables usage-blocked partitioning.
    #[must_use]
    pub fn respect_usage_blocked(mut self, respect: bool) -> Self {
        self.config.respect_usage_blocked = respect;
        self
    }

    /// Sets the type ids eligible for blocked cells.
    #[must_use]
    pub fn blocked_type_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.blocked_type_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the type ids eligible for unblocked cells.
    #[must_use]
    pub fn unblocked_type_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.unblocked_type_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn restart_on_failure(mut self, restart: bool) -> Self {
        self.config.restart_on_failure = restart;
        self
    }

    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    #[must_use]
    pub fn use_new_seed_on_retry(mut self, reseed: bool) -> Self {
        self.config.use_new_seed_on_retry = reseed;
        self
    }

    #[must_use]
    pub fn verbose_logging(mut self, verbose: bool) -> Self {
        self.config.verbose_logging = verbose;
        self
    }

    /// Sets the seed of the first attempt.
    #[must_use]
    pub fn base_seed(mut self, seed: u64) -> Self {
        self.config.base_seed = seed;
        self
    }

    /// Builds the `WfcConfig` instance.
    pub fn build(self) -> WfcConfig {
        self.config
    }
}

/// Fills every cell of `grid` with a type id from `catalog`.
///
/// Uses the default `LowestCountSelector` and an `AdjacencyPropagator`
/// whose trace logging follows `config.verbose_logging`.
///
/// # Errors
///
/// See [`solve_with`].
pub fn solve<G: CellGrid + ?Sized>(
    grid: &mut G,
    catalog: &TileCatalog,
    config: &WfcConfig,
) -> Result<SolveOutcome, WfcError> {
    solve_with(
        grid,
        catalog,
        config,
        &LowestCountSelector::new(),
        &AdjacencyPropagator::new(config.verbose_logging),
    )
}

/// Runs the attempt loop with explicit selection and propagation strategies.
///
/// Each attempt seeds a fresh candidate store and a fresh `StdRng`, then
/// alternates selection, collapse and propagation until every cell is
/// decided or a contradiction surfaces. A decided cell's type id is written
/// to `grid` immediately. The grid's type ids are snapshotted up front and
/// restored before every retry and before any error is returned, so on
/// failure the grid is exactly as it was before the call.
///
/// # Errors
///
/// * `WfcError::GridError` if the grid has no cells.
/// * `WfcError::EmptyCatalog` if the catalog has neither a selectable rule nor a joker.
/// * `WfcError::Contradiction` if the single allowed attempt failed.
/// * `WfcError::RetriesExhausted` if every allowed attempt failed.
pub fn solve_with<G: CellGrid + ?Sized>(
    grid: &mut G,
    catalog: &TileCatalog,
    config: &WfcConfig,
    selector: &dyn EntropySelector,
    propagator: &dyn ConstraintPropagator,
) -> Result<SolveOutcome, WfcError> {
    let (width, height) = (grid.width(), grid.height());
    if width == 0 || height == 0 {
        return Err(WfcError::GridError(format!(
            "cannot solve an empty {width}x{height} grid"
        )));
    }

    let (pools, warnings) = CandidatePools::build(catalog, config)?;
    let snapshot = take_snapshot(grid);
    let max_attempts = config.max_attempts();
    info!(
        "Starting solve on {width}x{height} grid with {} tiles (up to {max_attempts} attempts)...",
        catalog.len()
    );

    let mut attempt = 0;
    loop {
        let seed = config.seed_for_attempt(attempt);
        if attempt > 0 {
            restore_snapshot(grid, &snapshot);
        }
        debug!("Attempt {attempt}: seed {seed}");

        let result = run_attempt(
            grid,
            catalog,
            &pools,
            selector,
            propagator,
            seed,
            config.verbose_logging,
        );
        match result {
            Ok(AttemptResult::Success {
                joker_substitutions,
            }) => {
                info!(
                    "Solve finished after {} attempt(s) with seed {seed} ({joker_substitutions} joker substitutions).",
                    attempt + 1
                );
                return Ok(SolveOutcome {
                    attempts: attempt + 1,
                    seed,
                    joker_substitutions,
                    warnings,
                });
            }
            Ok(AttemptResult::Failed(report)) => {
                let report = Box::new(report.for_attempt(attempt, seed));
                attempt += 1;
                if attempt < max_attempts {
                    warn!("Attempt {} (seed {seed}) failed: {report}; retrying", attempt - 1);
                    continue;
                }
                restore_snapshot(grid, &snapshot);
                error!("Solve failed after {attempt} attempt(s): {report}");
                return Err(if config.restart_on_failure {
                    WfcError::RetriesExhausted {
                        attempts: attempt,
                        report,
                    }
                } else {
                    WfcError::Contradiction(report)
                });
            }
            Err(e) => {
                restore_snapshot(grid, &snapshot);
                error!("Solve aborted on attempt {attempt}: {e}");
                return Err(e);
            }
        }
    }
}

enum AttemptResult {
    Success { joker_substitutions: usize },
    Failed(ContradictionReport),
}

enum Step {
    Progress { joker_substitutions: usize },
    Finished,
    Contradiction(ContradictionReport),
}

fn run_attempt<G: CellGrid + ?Sized>(
    grid: &mut G,
    catalog: &TileCatalog,
    pools: &CandidatePools,
    selector: &dyn EntropySelector,
    propagator: &dyn ConstraintPropagator,
    seed: u64,
    verbose: bool,
) -> Result<AttemptResult, WfcError> {
    let mut store = CandidateStore::seed(grid, pools);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut joker_substitutions = 0;

    loop {
        match perform_step(
            &mut store, grid, catalog, selector, propagator, &mut rng, verbose,
        )? {
            Step::Progress {
                joker_substitutions: n,
            } => joker_substitutions += n,
            Step::Finished => {
                debug!(
                    "Attempt with seed {seed} finished, {} cells decided",
                    store.decided_count()
                );
                return Ok(AttemptResult::Success {
                    joker_substitutions,
                })
            }
            Step::Contradiction(report) => return Ok(AttemptResult::Failed(report)),
        }
    }
}

/// Performs a single step: select, decide, propagate.
fn perform_step<G: CellGrid + ?Sized>(
    store: &mut CandidateStore,
    grid: &mut G,
    catalog: &TileCatalog,
    selector: &dyn EntropySelector,
    propagator: &dyn ConstraintPropagator,
    rng: &mut StdRng,
    verbose: bool,
) -> Result<Step, WfcError> {
    let (index, rule) = match selector.select(store) {
        Selection::Done => return Ok(Step::Finished),
        Selection::Contradiction(index) => {
            if store.state(index).is_none() {
                return Err(WfcError::GridError(format!(
                    "selector reported a contradiction at cell {index}, outside the grid"
                )));
            }
            let coords = store.coords(index);
            debug!("Cell {coords:?} has no candidates");
            return Ok(Step::Contradiction(ContradictionReport::initial(
                coords,
                store.is_blocked(index),
                store.neighborhood(index, catalog),
            )));
        }
        Selection::Collapse(index) => {
            let set = undecided_set(store, index)?;
            let rule = collapse(set, catalog, rng).ok_or_else(|| {
                WfcError::GridError(format!("cell {:?} has nothing to collapse", store.coords(index)))
            })?;
            (index, rule)
        }
        Selection::Settle(index) => {
            let set = undecided_set(store, index)?;
            let rule = set.first_one().ok_or_else(|| {
                WfcError::GridError(format!("cell {:?} has nothing to settle", store.coords(index)))
            })?;
            (index, rule)
        }
    };

    let (x, y) = store.coords(index);
    let type_id = &catalog.rule(rule).type_id;
    if verbose {
        info!("Decided ({x}, {y}) = '{type_id}'");
    }
    store.decide(index, rule);
    grid.set_type_id(x, y, type_id.clone());

    match propagator.propagate(store, catalog, index) {
        Ok(joker_substitutions) => Ok(Step::Progress {
            joker_substitutions,
        }),
        Err(PropagationError::Contradiction(report)) => Ok(Step::Contradiction(*report)),
        Err(e @ PropagationError::NotDecided(..)) => Err(WfcError::GridError(e.to_string())),
    }
}

fn undecided_set(
    store: &CandidateStore,
    index: usize,
) -> Result<&bitvec::slice::BitSlice, WfcError> {
    store
        .state(index)
        .and_then(CellState::candidates)
        .map(|set| set.as_bitslice())
        .ok_or_else(|| {
            WfcError::GridError(format!(
                "selector picked cell {:?}, which is not undecided",
                store.coords(index)
            ))
        })
}

fn take_snapshot<G: CellGrid + ?Sized>(grid: &G) -> Vec<String> {
    let width = grid.width();
    (0..grid.height())
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| grid.type_id(x, y).to_owned())
        .collect()
}

fn restore_snapshot<G: CellGrid + ?Sized>(grid: &mut G, snapshot: &[String]) {
    let width = grid.width();
    for (index, type_id) in snapshot.iter().enumerate() {
        grid.set_type_id(index % width, index / width, type_id.clone());
    }
}
