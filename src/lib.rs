//! gridmap-forge application library
//!
//! This crate contains the configuration, logging setup, mask loading,
//! execution and output writers behind the `gridmap-forge` binary.

pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod mask;
pub mod output;

pub use config::AppConfig;
pub use error::AppError;

use anyhow::Context;
use clap::Parser;

/// Parses the command line, initializes logging and runs one solve.
pub fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();
    logging::init_logger(&config);

    log::info!("gridmap-forge starting");
    log::debug!("Loaded Config: {config:?}");

    execution::run(&config)
        .with_context(|| format!("failed to generate a grid from {:?}", config.rule_file))?;

    log::info!("gridmap-forge finished.");
    Ok(())
}
