use crate::config::ProgressLogLevel;
use anyhow::Result;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wfc_core::runner::ProgressCallback;
use wfc_core::{ProgressInfo, WfcError};

/// Log target of the records this module emits.
pub(crate) const TARGET: &str = module_path!();

/// Trait for reporting the progress of a generation.
pub trait ProgressReporter: Send + Sync {
    /// Called after every round with updated progress information.
    fn report(&mut self, info: &ProgressInfo) -> Result<()>;

    /// Called when generation completes successfully.
    fn finish(&mut self) -> Result<()>;

    /// Called when generation fails with an error.
    fn fail(&mut self, error: &WfcError) -> Result<()>;
}

/// Builds an engine callback that forwards every round to a shared reporter.
///
/// The caller keeps its own handle so it can call [`ProgressReporter::finish`]
/// or [`ProgressReporter::fail`] once the run returns.
pub fn shared_callback<R: ProgressReporter + 'static>(reporter: Arc<Mutex<R>>) -> ProgressCallback {
    Box::new(move |info: ProgressInfo| {
        let mut reporter = reporter
            .lock()
            .map_err(|_| WfcError::InternalError("progress reporter poisoned".into()))?;
        reporter
            .report(&info)
            .map_err(|e| WfcError::InternalError(e.to_string()))
    })
}

/// A `ProgressReporter` that writes rate-limited status lines to the log.
pub struct ConsoleProgressReporter {
    start_time: Instant,
    last_report_time: Option<Instant>,
    report_interval: Duration,
    level: ProgressLogLevel,
    reports: usize,
}

impl ConsoleProgressReporter {
    /// Creates a reporter that emits at most one line per `report_interval`.
    pub fn new(report_interval: Duration, level: ProgressLogLevel) -> Self {
        Self {
            start_time: Instant::now(),
            last_report_time: None,
            report_interval,
            level,
            reports: 0,
        }
    }

    /// Number of lines emitted so far.
    pub fn reports(&self) -> usize {
        self.reports
    }

    fn format_duration(duration: Duration) -> String {
        let secs = duration.as_secs();
        let millis = duration.subsec_millis();
        format!("{}.{:03}s", secs, millis)
    }

    fn emit(&self, msg: &str) {
        match self.level {
            ProgressLogLevel::Trace => log::trace!(target: TARGET, "{}", msg),
            ProgressLogLevel::Debug => log::debug!(target: TARGET, "{}", msg),
            ProgressLogLevel::Info => log::info!(target: TARGET, "{}", msg),
            ProgressLogLevel::Warn => log::warn!(target: TARGET, "{}", msg),
        }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report(&mut self, info: &ProgressInfo) -> Result<()> {
        let now = Instant::now();
        let due = self
            .last_report_time
            .map_or(true, |last| now.duration_since(last) >= self.report_interval);
        if !due {
            return Ok(());
        }

        let percentage = if info.total_cells > 0 {
            (info.collapsed_cells as f32 / info.total_cells as f32) * 100.0
        } else {
            100.0
        };
        let elapsed_secs = info.elapsed_time.as_secs_f32();
        let rate = if elapsed_secs > 0.0 {
            info.collapsed_cells as f32 / elapsed_secs
        } else {
            0.0
        };
        self.emit(&format!(
            "Progress: Attempt {} | Round {} | Collapsed {}/{} ({:.1}%) | Elapsed: {} | Rate: {:.1} cells/s",
            info.attempt + 1,
            info.rounds,
            info.collapsed_cells,
            info.total_cells,
            percentage,
            Self::format_duration(info.elapsed_time),
            rate
        ));
        self.last_report_time = Some(now);
        self.reports += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        log::info!(
            target: TARGET,
            "Generation finished successfully. Total time: {}",
            Self::format_duration(self.start_time.elapsed())
        );
        Ok(())
    }

    fn fail(&mut self, error: &WfcError) -> Result<()> {
        log::error!(
            target: TARGET,
            "Generation failed: {}. Total time: {}",
            error,
            Self::format_duration(self.start_time.elapsed())
        );
        Ok(())
    }
}
