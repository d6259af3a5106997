//! Repeated timed generations over one catalog and grid size.

use crate::error::AppError;
use anyhow::Error;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};
use wfc_core::{CollapseEngine, EngineSettings, WfcError};
use wfc_rules::TileCatalog;

/// Spacing between the base seeds of consecutive runs, so attempt seeds
/// (`base + attempt`) of different runs never overlap in practice.
const RUN_SEED_STRIDE: u64 = 1 << 32;

/// Outcome of a single benchmark run.
#[derive(Debug)]
pub struct BenchmarkResult {
    pub run: usize,
    pub seed: Option<u64>,
    /// Wall-clock time from engine construction to completion or failure.
    pub total_time: Duration,
    pub wfc_result: Result<(), WfcError>,
    pub rounds: u64,
    pub attempts: u32,
    pub contradictions: u32,
}

/// Aggregated timings over all runs of a scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkScenarioResult {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub num_tiles: usize,
    pub runs: usize,
    pub successful_runs: usize,
    pub failed_runs: usize,
    pub avg_total_time_ms: Option<f64>,
    pub median_total_time_ms: Option<f64>,
    pub stddev_total_time_ms: Option<f64>,
    pub avg_contradictions: Option<f64>,
}

fn run_seed(settings: &EngineSettings, run: usize) -> Option<u64> {
    settings
        .seed
        .map(|base| base.wrapping_add((run as u64).wrapping_mul(RUN_SEED_STRIDE)))
}

/// Runs one timed generation.
pub fn run_single_benchmark(
    catalog: &TileCatalog,
    settings: &EngineSettings,
    run: usize,
    shutdown: &AtomicBool,
) -> Result<BenchmarkResult, AppError> {
    let mut settings = settings.clone();
    settings.seed = run_seed(&settings, run);
    let seed = settings.seed;

    let start_time = Instant::now();
    let mut engine = CollapseEngine::new(catalog.clone(), settings)?;
    let wfc_result = match engine.run(shutdown) {
        Ok(_) => Ok(()),
        Err(WfcError::Interrupted) => return Err(AppError::Cancelled),
        Err(e) => Err(e),
    };
    let total_time = start_time.elapsed();

    Ok(BenchmarkResult {
        run,
        seed,
        total_time,
        wfc_result,
        rounds: engine.rounds(),
        attempts: engine.attempt() + 1,
        contradictions: engine.contradictions(),
    })
}

/// Runs `runs` independent generations and aggregates their timings.
pub fn run_benchmark(
    catalog: &TileCatalog,
    settings: &EngineSettings,
    runs: usize,
    shutdown: &AtomicBool,
) -> Result<(Vec<BenchmarkResult>, BenchmarkScenarioResult), AppError> {
    let num_tiles = catalog.expand_rotations().map_err(WfcError::from)?.len();
    let mut results = Vec::with_capacity(runs);
    for run in 0..runs {
        let result = run_single_benchmark(catalog, settings, run, shutdown)?;
        match &result.wfc_result {
            Ok(()) => log::info!(
                "Run {}/{}: {:.2?}, {} rounds, {} contradictions",
                run + 1,
                runs,
                result.total_time,
                result.rounds,
                result.contradictions
            ),
            Err(e) => log::warn!("Run {}/{} failed after {:.2?}: {}", run + 1, runs, result.total_time, e),
        }
        results.push(result);
    }
    let scenario = summarize(settings, num_tiles, &results);
    Ok((results, scenario))
}

fn calculate_median(data: &mut [f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    data.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = data.len() / 2;
    if data.len() % 2 == 0 {
        Some((data[mid - 1] + data[mid]) / 2.0)
    } else {
        Some(data[mid])
    }
}

fn calculate_std_dev(data: &[f64], mean: f64) -> Option<f64> {
    let n = data.len();
    if n < 2 {
        return None;
    }
    let variance = data
        .iter()
        .map(|value| {
            let diff = mean - value;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1) as f64;
    Some(variance.sqrt())
}

fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        None
    } else {
        Some(data.iter().sum::<f64>() / data.len() as f64)
    }
}

/// Aggregates the successful runs of a scenario.
pub fn summarize(
    settings: &EngineSettings,
    num_tiles: usize,
    results: &[BenchmarkResult],
) -> BenchmarkScenarioResult {
    let successful: Vec<&BenchmarkResult> = results.iter().filter(|r| r.wfc_result.is_ok()).collect();
    let mut times_ms: Vec<f64> = successful
        .iter()
        .map(|r| r.total_time.as_secs_f64() * 1000.0)
        .collect();
    let contradictions: Vec<f64> = successful.iter().map(|r| f64::from(r.contradictions)).collect();
    let avg = mean(&times_ms);
    let stddev = avg.and_then(|m| calculate_std_dev(&times_ms, m));

    BenchmarkScenarioResult {
        width: settings.dim_x,
        height: settings.dim_y,
        depth: settings.dim_z,
        num_tiles,
        runs: results.len(),
        successful_runs: successful.len(),
        failed_runs: results.len() - successful.len(),
        avg_total_time_ms: avg,
        median_total_time_ms: calculate_median(&mut times_ms),
        stddev_total_time_ms: stddev,
        avg_contradictions: mean(&contradictions),
    }
}

fn format_ms(value: Option<f64>) -> String {
    value.map(|t| format!("{:.3}", t)).unwrap_or_else(|| "-".to_string())
}

/// Logs a one-block summary of a scenario.
pub fn report_summary(scenario: &BenchmarkScenarioResult) {
    log::info!(
        "Benchmark {}x{}x{} ({} tiles): {}/{} runs succeeded | avg {} ms | median {} ms | std dev {} ms | avg contradictions {}",
        scenario.width,
        scenario.height,
        scenario.depth,
        scenario.num_tiles,
        scenario.successful_runs,
        scenario.runs,
        format_ms(scenario.avg_total_time_ms),
        format_ms(scenario.median_total_time_ms),
        format_ms(scenario.stddev_total_time_ms),
        format_ms(scenario.avg_contradictions)
    );
}

/// Writes one row per run to a CSV file.
pub fn write_results_to_csv(results: &[BenchmarkResult], path: &Path) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "Run",
        "Seed",
        "Result",
        "Time (ms)",
        "Rounds",
        "Attempts",
        "Contradictions",
    ])?;

    for result in results {
        wtr.write_record([
            result.run.to_string(),
            result.seed.map(|s| s.to_string()).unwrap_or_default(),
            match &result.wfc_result {
                Ok(()) => "ok".to_string(),
                Err(e) => e.to_string(),
            },
            format!("{:.6}", result.total_time.as_secs_f64() * 1000.0),
            result.rounds.to_string(),
            result.attempts.to_string(),
            result.contradictions.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
