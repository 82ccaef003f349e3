//! Handles the core execution: load, solve, save.

use crate::config::AppConfig;
use crate::error::AppError;
use crate::mask::BlockedMask;
use crate::output;
use gridmap_rules::loader::load_from_file;
use gridmap_solver::{solve, SolveOutcome, TileGrid};
use log::{error, info, warn};

/// Builds the host grid from the mask, or an open grid of the requested size.
pub fn build_grid(config: &AppConfig) -> Result<TileGrid, AppError> {
    if let Some(path) = &config.mask {
        return Ok(BlockedMask::load(path)?.to_grid()?);
    }
    let (width, height) = config.dimensions();
    if width == 0 || height == 0 {
        return Err(AppError::Config(format!(
            "grid dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(TileGrid::new(width, height))
}

/// Runs one solve as configured and writes the result.
///
/// On a contradiction the report is written to `config.report_path` (if set)
/// before the error is returned.
pub fn run(config: &AppConfig) -> Result<SolveOutcome, AppError> {
    let catalog = load_from_file(&config.rule_file)?;
    let solver_config = config.solver_config()?;
    log::debug!("Solver config: {solver_config:?}");
    let mut grid = build_grid(config)?;

    info!(
        "Solving {}x{} grid (seed {}, restart on failure: {})...",
        grid.width, grid.height, solver_config.base_seed, solver_config.restart_on_failure
    );

    let outcome = match solve(&mut grid, &catalog, &solver_config) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Solve failed: {e}");
            if let (Some(path), Some(report)) = (&config.report_path, e.report()) {
                output::write_report(report, path)?;
            }
            return Err(e.into());
        }
    };

    for warning in &outcome.warnings {
        warn!("{warning}");
    }
    info!(
        "Solved in {} attempt(s), seed {}, {} joker substitution(s).",
        outcome.attempts, outcome.seed, outcome.joker_substitutions
    );

    output::save_grid(&grid, &outcome, config.format, config.output_path.as_deref())?;

    if config.preview {
        eprint!("{}", output::render_preview(&grid, &catalog));
        eprintln!("{}", output::render_legend(&catalog));
    }

    Ok(outcome)
}
