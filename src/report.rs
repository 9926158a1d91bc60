use crate::utils::{format_count, format_duration, mb_from_bytes, round_two_decimals};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// Row-count statistics for one table, accumulated across all of its batches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingResult {
    pub source_entry_name: String,
    pub raw_rows: usize,
    pub clean_rows: usize,
    pub output_path: PathBuf,
}

impl ProcessingResult {
    pub fn new(source_entry_name: &str, output_path: PathBuf) -> Self {
        Self {
            source_entry_name: source_entry_name.to_string(),
            raw_rows: 0,
            clean_rows: 0,
            output_path,
        }
    }

    /// Adds one batch's counts.
    pub fn record_batch(&mut self, raw_rows: usize, clean_rows: usize) {
        self.raw_rows += raw_rows;
        self.clean_rows += clean_rows;
    }

    pub fn dropped_rows(&self) -> usize {
        self.raw_rows - self.clean_rows
    }
}

/// A table that failed; the run carried on without it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFailure {
    pub source_entry_name: String,
    pub reason: String,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Completed tables, in processing order
    pub results: Vec<ProcessingResult>,
    /// Tables absent from the archive
    pub skipped: Vec<String>,
    pub failed: Vec<TableFailure>,
    /// Set when an interrupt stopped the run early
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn result_for(&self, source_entry_name: &str) -> Option<&ProcessingResult> {
        self.results
            .iter()
            .find(|r| r.source_entry_name == source_entry_name)
    }

    pub fn is_complete_success(&self) -> bool {
        self.skipped.is_empty() && self.failed.is_empty() && !self.interrupted
    }

    /// Logs one line per completed table plus the run totals.
    pub fn log_summary(&self) {
        for result in &self.results {
            let size_mb = std::fs::metadata(&result.output_path)
                .map(|m| round_two_decimals(mb_from_bytes(m.len())))
                .unwrap_or(0.0);
            info!(
                table = %result.source_entry_name,
                raw_rows = result.raw_rows,
                clean_rows = result.clean_rows,
                dropped_rows = result.dropped_rows(),
                output = %result.output_path.display(),
                output_size_mb = size_mb,
                "Table summary"
            );
        }

        for failure in &self.failed {
            warn!(
                table = %failure.source_entry_name,
                reason = %failure.reason,
                "Table failed"
            );
        }

        info!(
            completed = self.results.len(),
            skipped = self.skipped.len(),
            failed = self.failed.len(),
            interrupted = self.interrupted,
            elapsed = format_duration(self.elapsed),
            "Run completed"
        );
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SUMMARY")?;
        for result in &self.results {
            writeln!(f, "  {}", result.source_entry_name)?;
            writeln!(
                f,
                "    {:>10} raw rows -> {:>10} clean rows ({} dropped)",
                format_count(result.raw_rows),
                format_count(result.clean_rows),
                format_count(result.dropped_rows())
            )?;
            writeln!(f, "    Saved: {}", result.output_path.display())?;
        }
        for name in &self.skipped {
            writeln!(f, "  {name}: skipped (not in archive)")?;
        }
        for failure in &self.failed {
            writeln!(f, "  {}: failed ({})", failure.source_entry_name, failure.reason)?;
        }
        if self.interrupted {
            writeln!(f, "  Run interrupted before all tables were processed")?;
        }
        write!(
            f,
            "  {} completed, {} skipped, {} failed in {}",
            self.results.len(),
            self.skipped.len(),
            self.failed.len(),
            format_duration(self.elapsed)
        )
    }
}
