//! Logging setup for the application.

use crate::config::{AppConfig, GlobalLogLevel};
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Maps the configured level to a `log` filter.
pub const fn level_filter(level: GlobalLogLevel) -> LevelFilter {
    match level {
        GlobalLogLevel::Trace => LevelFilter::Trace,
        GlobalLogLevel::Debug => LevelFilter::Debug,
        GlobalLogLevel::Info => LevelFilter::Info,
        GlobalLogLevel::Warn => LevelFilter::Warn,
        GlobalLogLevel::Error => LevelFilter::Error,
    }
}

/// Initializes the logger from the application settings.
///
/// `config.global_log_level` is the default filter. If RUST_LOG is set it
/// takes precedence, so individual modules such as `gridmap_solver::propagator`
/// can be raised or silenced without touching the command line.
///
/// Verbose solver tracing is logged at `info`, so `--verbose` only shows up
/// when the effective level admits it.
pub fn init_logger(config: &AppConfig) {
    let global_level = level_filter(config.global_log_level);

    let env = Env::default().default_filter_or(global_level.as_str().to_ascii_lowercase());
    let mut builder = Builder::from_env(env);
    builder.format_timestamp(None);

    if builder.try_init().is_err() {
        log::warn!("Logger was already initialized; keeping the existing one");
        return;
    }

    log::debug!(
        "Logger initialized with global log level: {:?}",
        config.global_log_level
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(level_filter(GlobalLogLevel::Trace), LevelFilter::Trace);
        assert_eq!(level_filter(GlobalLogLevel::Info), LevelFilter::Info);
        assert_eq!(level_filter(GlobalLogLevel::Error), LevelFilter::Error);
    }
}
