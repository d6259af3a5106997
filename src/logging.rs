//! Logging setup for the application.

use crate::config::{AppConfig, GlobalLogLevel, ProgressLogLevel};
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Module whose records carry progress reports.
pub const PROGRESS_TARGET: &str = "socket_forge::progress";

pub fn progress_filter(level: &ProgressLogLevel) -> LevelFilter {
    match level {
        ProgressLogLevel::Trace => LevelFilter::Trace,
        ProgressLogLevel::Debug => LevelFilter::Debug,
        ProgressLogLevel::Info => LevelFilter::Info,
        ProgressLogLevel::Warn => LevelFilter::Warn,
    }
}

pub fn global_filter(level: &GlobalLogLevel) -> LevelFilter {
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
/// The global level comes from `config.global_log_level` and progress
/// reports use `config.progress_log_level`. Directives in `RUST_LOG` are
/// parsed first, so module-specific entries there still apply.
pub fn init_logger(config: &AppConfig) {
    let env = Env::default().filter_or("RUST_LOG", "info");
    let mut builder = Builder::from_env(env);
    builder.filter_level(global_filter(&config.global_log_level));
    builder.filter_module(PROGRESS_TARGET, progress_filter(&config.progress_log_level));
    builder.init();

    log::debug!(
        "Logger initialized with global log level: {:?}, progress log level: {:?}",
        config.global_log_level,
        config.progress_log_level
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping() {
        assert_eq!(progress_filter(&ProgressLogLevel::Warn), LevelFilter::Warn);
        assert_eq!(global_filter(&GlobalLogLevel::Error), LevelFilter::Error);
        assert_eq!(global_filter(&GlobalLogLevel::default()), LevelFilter::Info);
    }

    #[test]
    fn test_progress_target_matches_module() {
        assert_eq!(PROGRESS_TARGET, crate::progress::TARGET);
    }
}
