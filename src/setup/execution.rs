//! Handles the core execution logic for standard and benchmark modes.

use crate::{
    benchmark,
    config::AppConfig,
    error::AppError,
    output::{self, GenerationReport},
    progress::{self, ConsoleProgressReporter, ProgressReporter},
    visualization::{TerminalVisualizer, Visualizer},
};
use log::{error, info, warn};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use wfc_core::{CollapseEngine, EngineSettings, RunSummary, WfcError};
use wfc_rules::{loader::load_from_file, TileCatalog};

/// Loads the catalog and settings, then runs the mode selected by `config`.
pub fn run(config: &AppConfig, shutdown: &AtomicBool) -> Result<(), AppError> {
    info!("Loading catalog from: {:?}", config.rule_file);
    let catalog = load_from_file(&config.rule_file)?;
    let settings = config.engine_settings().map_err(|e| {
        error!("{}", e);
        e
    })?;
    info!(
        "Catalog loaded: {} authored tiles, grid {}x{}x{}",
        catalog.tiles.len(),
        settings.dim_x,
        settings.dim_y,
        settings.dim_z
    );

    if config.benchmark_runs > 0 {
        run_benchmark_mode(config, &catalog, &settings, shutdown)
    } else {
        run_standard_mode(config, catalog, settings, shutdown)
    }
}

/// One generation: progress reporting, output file and optional preview.
pub fn run_standard_mode(
    config: &AppConfig,
    catalog: TileCatalog,
    settings: EngineSettings,
    shutdown: &AtomicBool,
) -> Result<(), AppError> {
    let dimensions = [settings.dim_x, settings.dim_y, settings.dim_z];
    let cell_size = settings.cell_size;
    let mut engine = CollapseEngine::new(catalog, settings)?;
    let reporter = config.report_progress_interval.map(|interval| {
        Arc::new(Mutex::new(ConsoleProgressReporter::new(
            interval,
            config.progress_log_level.clone(),
        )))
    });
    engine.on_regenerate(Box::new(|| log::debug!("Discarding grid for a fresh attempt")));

    let summary = match generate(&mut engine, shutdown, reporter) {
        Ok(summary) => summary,
        Err(WfcError::Interrupted) => {
            warn!("Generation interrupted before completion.");
            return Err(AppError::Cancelled);
        }
        Err(e) => {
            error!("Generation failed: {}", e);
            return Err(e.into());
        }
    };
    info!(
        "Generation completed successfully in {:.2?} ({} attempts, {} contradictions)",
        summary.elapsed, summary.attempts, summary.contradictions
    );

    let report = GenerationReport::new(dimensions, cell_size, &summary, engine.placements());
    if let Some(path) = &config.output_path {
        output::save_report(&report, config.output_format, path).map_err(AppError::SaveError)?;
    } else {
        info!("Output path not specified, skipping save.");
    }
    if let Some(layer) = config.preview_layer {
        TerminalVisualizer::new(layer).display_state(&report)?;
    }

    println!(
        "Generated {} tiles in {} attempt(s), {} rounds, {:.2?}",
        summary.placed, summary.attempts, summary.rounds, summary.elapsed
    );
    Ok(())
}

/// Runs the engine to completion, closing the reporter with `finish` or
/// `fail` depending on the outcome.
pub fn generate<R: ProgressReporter + 'static>(
    engine: &mut CollapseEngine,
    shutdown: &AtomicBool,
    reporter: Option<Arc<Mutex<R>>>,
) -> Result<RunSummary, WfcError> {
    let Some(reporter) = reporter else {
        return engine.run(shutdown);
    };
    engine.set_progress_callback(progress::shared_callback(Arc::clone(&reporter)));
    let result = engine.run(shutdown);

    match reporter.lock() {
        Ok(mut reporter) => {
            let closed = match &result {
                Ok(_) => reporter.finish(),
                Err(e) => reporter.fail(e),
            };
            if let Err(e) = closed {
                warn!("Progress reporter failed to close: {}", e);
            }
        }
        Err(_) => warn!("Progress reporter poisoned, skipping final report"),
    }
    result
}

pub fn run_benchmark_mode(
    config: &AppConfig,
    catalog: &TileCatalog,
    settings: &EngineSettings,
    shutdown: &AtomicBool,
) -> Result<(), AppError> {
    info!("Benchmark mode enabled. Runs: {}", config.benchmark_runs);
    let (results, scenario) = benchmark::run_benchmark(catalog, settings, config.benchmark_runs, shutdown)?;
    benchmark::report_summary(&scenario);

    if let Some(path) = &config.benchmark_csv_output {
        benchmark::write_results_to_csv(&results, path)?;
        info!("Benchmark results written to {:?}", path);
    }
    println!(
        "Benchmark: {}/{} runs succeeded",
        scenario.successful_runs, scenario.runs
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfc_core::ProgressInfo;
    use wfc_rules::{BorderKind, Socket, Sockets, TilePrototype};

    #[derive(Default)]
    struct RecordingReporter {
        reports: usize,
        finished: bool,
        failure: Option<String>,
    }

    impl ProgressReporter for RecordingReporter {
        fn report(&mut self, _info: &ProgressInfo) -> anyhow::Result<()> {
            self.reports += 1;
            Ok(())
        }

        fn finish(&mut self) -> anyhow::Result<()> {
            self.finished = true;
            Ok(())
        }

        fn fail(&mut self, error: &WfcError) -> anyhow::Result<()> {
            self.failure = Some(error.to_string());
            Ok(())
        }
    }

    fn engine() -> CollapseEngine {
        let plain = Sockets::uniform(Socket::symmetric(BorderKind::Empty));
        let catalog = TileCatalog::new(
            vec![
                TilePrototype::new("floor", plain),
                TilePrototype::new("air", plain),
            ],
            "floor",
            "air",
        );
        let settings = EngineSettings::builder().dimensions(2, 3, 2).seed(5).build();
        CollapseEngine::new(catalog, settings).unwrap()
    }

    #[test]
    fn test_generate_finishes_reporter() {
        let reporter = Arc::new(Mutex::new(RecordingReporter::default()));
        let summary = generate(&mut engine(), &AtomicBool::new(false), Some(Arc::clone(&reporter))).unwrap();

        let reporter = reporter.lock().unwrap();
        assert_eq!(summary.placed, 12);
        assert!(reporter.reports > 0);
        assert!(reporter.finished);
        assert!(reporter.failure.is_none());
    }

    #[test]
    fn test_generate_reports_failure() {
        let reporter = Arc::new(Mutex::new(RecordingReporter::default()));
        let result = generate(&mut engine(), &AtomicBool::new(true), Some(Arc::clone(&reporter)));

        assert_eq!(result, Err(WfcError::Interrupted));
        let reporter = reporter.lock().unwrap();
        assert!(!reporter.finished);
        assert_eq!(reporter.failure, Some(WfcError::Interrupted.to_string()));
    }

    #[test]
    fn test_generate_without_reporter() {
        let summary =
            generate::<RecordingReporter>(&mut engine(), &AtomicBool::new(false), None).unwrap();
        assert_eq!(summary.placed, 12);
    }
}
