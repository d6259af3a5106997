use crate::error::AppError;
use clap::{Parser, ValueEnum};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::path::PathBuf;
use std::time::Duration;
use wfc_core::{EngineSettings, FrontierShape};

/// Prefix of environment variables overriding generation settings.
pub const ENV_PREFIX: &str = "SOCKET_FORGE_";

/// Format of the generated layout on disk.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tile names, one block per Y layer.
    #[default]
    Text,
    Json,
    Csv,
}

/// Log level for progress reports.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum ProgressLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
}

/// Log level for everything except progress reports.
#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum GlobalLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Configuration for the Socket Forge application.
///
/// Generation settings are layered: built-in defaults, then the TOML
/// settings file, then `SOCKET_FORGE_*` environment variables, then the
/// flags given here.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Path to the RON catalog defining tiles, sockets and boundary roles.
    #[arg(short, long, value_name = "FILE", env = "SOCKET_FORGE_RULE_FILE")]
    pub rule_file: PathBuf,

    /// Optional TOML file with generation settings.
    #[arg(short = 'c', long, value_name = "FILE")]
    pub settings_file: Option<PathBuf>,

    /// Width of the grid (X).
    #[arg(long)]
    pub width: Option<usize>,

    /// Number of layers (Y).
    #[arg(long)]
    pub height: Option<usize>,

    /// Depth of the grid (Z).
    #[arg(long)]
    pub depth: Option<usize>,

    /// World-space size of one cell.
    #[arg(long)]
    pub cell_size: Option<f32>,

    /// Base seed for the random number generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Give up after this many attempts.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Only examine cells near recent collapses.
    #[arg(long, default_value_t = false)]
    pub optimize: bool,

    /// Neighborhood marked visitable after each collapse.
    #[arg(long, value_enum)]
    pub frontier: Option<FrontierShape>,

    /// Collapse cells in index order instead of by lowest entropy.
    #[arg(long, default_value_t = false)]
    pub in_order: bool,

    /// Repeat propagation sweeps until nothing changes.
    #[arg(long, default_value_t = false)]
    pub fixed_point: bool,

    /// Path to save the generated layout.
    #[arg(short, long, value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    /// Report progress updates every specified interval (e.g., "1s", "500ms").
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub report_progress_interval: Option<Duration>,

    /// Print a colored preview of this Y layer when done.
    #[arg(long, value_name = "LAYER")]
    pub preview_layer: Option<usize>,

    /// Run this many independent generations and report timings instead of
    /// saving a layout.
    #[arg(long, default_value_t = 0)]
    pub benchmark_runs: usize,

    /// Optional: Path to save benchmark results as a CSV file.
    #[arg(long, value_name = "CSV_FILE")]
    pub benchmark_csv_output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ProgressLogLevel::Info)]
    pub progress_log_level: ProgressLogLevel,

    #[arg(long, value_enum, default_value_t = GlobalLogLevel::Info)]
    pub global_log_level: GlobalLogLevel,
}

impl AppConfig {
    /// Resolves the engine settings from every configuration layer.
    pub fn engine_settings(&self) -> Result<EngineSettings, AppError> {
        let mut figment = Figment::from(Serialized::defaults(EngineSettings::default()));
        if let Some(path) = &self.settings_file {
            if !path.is_file() {
                return Err(AppError::Config(format!(
                    "Settings file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["rule_file"]));

        let mut settings: EngineSettings = figment
            .extract()
            .map_err(|e| AppError::Config(e.to_string()))?;
        self.apply_overrides(&mut settings);
        log::debug!("Resolved engine settings: {:?}", settings);
        Ok(settings)
    }

    fn apply_overrides(&self, settings: &mut EngineSettings) {
        if let Some(width) = self.width {
            settings.dim_x = width;
        }
        if let Some(height) = self.height {
            settings.dim_y = height;
        }
        if let Some(depth) = self.depth {
            settings.dim_z = depth;
        }
        if let Some(cell_size) = self.cell_size {
            settings.cell_size = cell_size;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        if self.max_attempts.is_some() {
            settings.max_attempts = self.max_attempts;
        }
        if let Some(frontier) = self.frontier {
            settings.frontier = frontier;
        }
        settings.use_optimization |= self.optimize;
        settings.in_order_generation |= self.in_order;
        settings.propagate_to_fixed_point |= self.fixed_point;
    }
}
