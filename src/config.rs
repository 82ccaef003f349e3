use crate::error::AppError;
use clap::{Parser, ValueEnum};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use gridmap_solver::WfcConfig;
use serde::Serialize;
use std::path::PathBuf;

/// Prefix of environment variables that override solver settings.
pub const ENV_PREFIX: &str = "GRIDMAP_";

/// Grid width and height used when neither a mask nor a size is given.
pub const DEFAULT_SIZE: usize = 10;

/// Serialization format of the solved grid.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Space-separated type ids, one line per row.
    #[default]
    Text,
    /// One CSV record per row.
    Csv,
    /// A JSON document with the rows and solve statistics.
    Json,
}

/// Represents the global log level options.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GlobalLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Configuration for the gridmap-forge application.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Path to the RON or JSON rule file defining the tile catalog.
    #[arg(short, long, value_name = "FILE")]
    pub rule_file: PathBuf,

    /// Width of the output grid.
    #[arg(long, conflicts_with = "mask")]
    pub width: Option<usize>,

    /// Height of the output grid.
    #[arg(long, conflicts_with = "mask")]
    pub height: Option<usize>,

    /// Text mask of usage-blocked cells ('#' or 'X' blocked, '.' open).
    /// Its dimensions define the grid.
    #[arg(long, value_name = "FILE")]
    pub mask: Option<PathBuf>,

    /// Path to save the generated grid. Prints to stdout when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Format of the saved grid.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Optional TOML file with solver settings.
    #[arg(short, long, value_name = "FILE", env = "GRIDMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Seed of the first attempt.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Extra attempts allowed after a contradiction.
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Fail on the first contradiction instead of retrying.
    #[arg(long, default_value_t = false)]
    pub no_restart: bool,

    /// Reuse the base seed on every retry.
    #[arg(long, default_value_t = false)]
    pub fixed_seed: bool,

    /// Restrict blocked and unblocked cells to their own tile pools.
    #[arg(long, default_value_t = false)]
    pub respect_usage_blocked: bool,

    /// Comma-separated type ids allowed on blocked cells.
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub blocked_types: Vec<String>,

    /// Comma-separated type ids allowed on unblocked cells.
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub unblocked_types: Vec<String>,

    /// Log candidate pools, decisions and every narrowed neighbor.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Write a JSON contradiction report here if the solve fails.
    #[arg(long, value_name = "FILE")]
    pub report_path: Option<PathBuf>,

    /// Print a colored preview of the grid to the terminal.
    #[arg(long, default_value_t = false)]
    pub preview: bool,

    /// Log level for everything not covered by RUST_LOG.
    #[arg(long, value_enum, default_value_t = GlobalLogLevel::Info)]
    pub global_log_level: GlobalLogLevel,
}

/// Solver settings given on the command line. Unset fields are skipped so
/// lower layers keep their values.
#[derive(Serialize, Default, Debug)]
struct SolverOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    base_seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    restart_on_failure: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    use_new_seed_on_retry: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    respect_usage_blocked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verbose_logging: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocked_type_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unblocked_type_ids: Option<Vec<String>>,
}

impl AppConfig {
    /// Grid size from the command line, defaulting each missing side.
    pub fn dimensions(&self) -> (usize, usize) {
        (
            self.width.unwrap_or(DEFAULT_SIZE),
            self.height.unwrap_or(DEFAULT_SIZE),
        )
    }

    fn overrides(&self) -> SolverOverrides {
        let ids = |ids: &Vec<String>| (!ids.is_empty()).then(|| ids.clone());
        SolverOverrides {
            base_seed: self.seed,
            max_retries: self.max_retries,
            restart_on_failure: self.no_restart.then_some(false),
            use_new_seed_on_retry: self.fixed_seed.then_some(false),
            respect_usage_blocked: self.respect_usage_blocked.then_some(true),
            verbose_logging: self.verbose.then_some(true),
            blocked_type_ids: ids(&self.blocked_types),
            unblocked_type_ids: ids(&self.unblocked_types),
        }
    }

    /// The layered solver configuration: built-in defaults, then the TOML
    /// file, then `GRIDMAP_*` environment variables, then command-line flags.
    pub fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(WfcConfig::default()));
        if let Some(path) = &self.config {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
            .merge(Serialized::defaults(self.overrides()))
    }

    /// Extracts the solver configuration from all layers.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the settings file is missing or any
    /// layer holds a value of the wrong type.
    pub fn solver_config(&self) -> Result<WfcConfig, AppError> {
        if let Some(path) = &self.config {
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "settings file {} does not exist",
                    path.display()
                )));
            }
        }
        self.figment()
            .extract()
            .map_err(|e| AppError::Config(e.to_string()))
    }
}
