use crate::cancel::CancelFlag;
use crate::cleaner::clean_batch;
use crate::config::ResolvedConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{SizeClass, TableKind, TableSpec};
use crate::reader::{missing_header, read_chunks, read_whole};
use crate::report::{ProcessingResult, RunReport, TableFailure};
use crate::source::{locate_archive, SourceArchive};
use crate::writer::{append_with_optional_header, write_new};
use polars::prelude::DataFrame;
use std::fs;
use std::io::{Read, Seek};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Terminal state of one table.
#[derive(Debug)]
pub enum TableOutcome {
    Completed(ProcessingResult),
    /// The entry is not in the archive
    Skipped,
    Failed(AppError),
    /// An interrupt stopped the table after a complete batch
    Interrupted,
}

/// Runs the whole extract, clean and save workflow.
///
/// # Workflow
///
/// 1. Locates the archive among `config.archive_candidates`
/// 2. Creates `config.output_dir` if needed
/// 3. Opens the archive once and processes every registry table in order
///
/// # Errors
///
/// Only run-fatal conditions are returned: an invalid configuration, a missing
/// archive ([`AppError::SourceNotFound`]), an output directory that cannot be
/// created, or an archive that cannot be opened. Failures of individual tables
/// are recorded in the returned [`RunReport`] instead.
pub fn run_pipeline(config: &ResolvedConfig, cancel: &CancelFlag) -> AppResult<RunReport> {
    config.validate()?;

    let archive_path = locate_archive(&config.archive_candidates)?;

    fs::create_dir_all(&config.output_dir).map_err(|e| {
        AppError::IoError(format!(
            "Failed to create output directory {}: {e}",
            config.output_dir.display()
        ))
    })?;
    info!(output_dir = %config.output_dir.display(), "Output directory ready");

    let mut archive = SourceArchive::open(&archive_path)?;
    Ok(run_tables(&mut archive, config, cancel))
}

/// Processes every registry table found in an open archive.
///
/// A table that fails never aborts the loop. An interrupt stops it before the
/// next table, or after the current chunk of a chunked table.
pub fn run_tables<R: Read + Seek>(
    archive: &mut SourceArchive<R>,
    config: &ResolvedConfig,
    cancel: &CancelFlag,
) -> RunReport {
    let start = Instant::now();
    let mut report = RunReport::default();

    for kind in TableKind::ALL {
        if cancel.is_cancelled() {
            report.interrupted = true;
            break;
        }

        let spec = kind.spec();
        info!(
            table = spec.source_entry_name,
            name = kind.display_name(),
            "Processing table"
        );

        match process_table(archive, spec, config, cancel) {
            TableOutcome::Completed(result) => report.results.push(result),
            TableOutcome::Skipped => {
                warn!(
                    table = spec.source_entry_name,
                    "Table not found in archive, skipping"
                );
                report.skipped.push(spec.source_entry_name.to_string());
            }
            TableOutcome::Failed(e) => {
                error!(
                    table = spec.source_entry_name,
                    error = %e,
                    "Error processing table"
                );
                report.failed.push(TableFailure {
                    source_entry_name: spec.source_entry_name.to_string(),
                    reason: e.to_string(),
                });
            }
            TableOutcome::Interrupted => {
                warn!(
                    table = spec.source_entry_name,
                    "Run interrupted, table left incomplete"
                );
                report.interrupted = true;
                break;
            }
        }
    }

    report.elapsed = start.elapsed();
    report
}

/// Drives one table to a terminal state.
pub fn process_table<R: Read + Seek>(
    archive: &mut SourceArchive<R>,
    spec: &TableSpec,
    config: &ResolvedConfig,
    cancel: &CancelFlag,
) -> TableOutcome {
    if !archive.contains(spec.source_entry_name) {
        return TableOutcome::Skipped;
    }

    let output_path = config.output_dir.join(spec.output_name);
    let outcome = match config.size_class(spec) {
        SizeClass::Standard => process_whole(archive, spec, &output_path).map(Some),
        SizeClass::Large => process_chunked(archive, spec, &output_path, config, cancel),
    };

    match outcome {
        Ok(Some(result)) => TableOutcome::Completed(result),
        Ok(None) => TableOutcome::Interrupted,
        Err(e) => TableOutcome::Failed(e),
    }
}

fn process_whole<R: Read + Seek>(
    archive: &mut SourceArchive<R>,
    spec: &TableSpec,
    output_path: &Path,
) -> AppResult<ProcessingResult> {
    let raw = read_whole(archive, spec.source_entry_name)?;
    info!(table = spec.source_entry_name, raw_rows = raw.height(), "Read table");

    let mut outcome = clean_batch(raw, spec)?;
    if outcome.dropped_rows() > 0 {
        warn!(
            table = spec.source_entry_name,
            dropped_rows = outcome.dropped_rows(),
            "Dropped rows (duplicates / null keys)"
        );
    }

    write_new(&mut outcome.batch, output_path)?;
    log_preview(spec, &outcome.batch);

    let mut result = ProcessingResult::new(spec.source_entry_name, output_path.to_path_buf());
    result.record_batch(outcome.raw_rows, outcome.clean_rows);
    log_table_done(&result);
    Ok(result)
}

/// Streams a large table chunk by chunk. Returns `None` when interrupted.
fn process_chunked<R: Read + Seek>(
    archive: &mut SourceArchive<R>,
    spec: &TableSpec,
    output_path: &Path,
    config: &ResolvedConfig,
    cancel: &CancelFlag,
) -> AppResult<Option<ProcessingResult>> {
    info!(
        table = spec.source_entry_name,
        chunk_size = config.chunk_size,
        "Large table, reading in chunks"
    );

    let mut result = ProcessingResult::new(spec.source_entry_name, output_path.to_path_buf());
    let mut chunks_written = 0usize;

    for chunk in read_chunks(archive, spec.source_entry_name, config.chunk_size)? {
        let mut outcome = clean_batch(chunk?, spec)?;
        result.record_batch(outcome.raw_rows, outcome.clean_rows);

        // Header and truncation on the first chunk only
        if chunks_written == 0 {
            write_new(&mut outcome.batch, output_path)?;
        } else {
            append_with_optional_header(&mut outcome.batch, output_path, false)?;
        }
        chunks_written += 1;

        if chunks_written % config.progress_every == 0 {
            info!(
                table = spec.source_entry_name,
                chunks = chunks_written,
                rows = result.raw_rows,
                "Processed rows so far"
            );
        }

        if cancel.is_cancelled() {
            info!(
                table = spec.source_entry_name,
                chunks = chunks_written,
                rows = result.raw_rows,
                "Stopping after current chunk"
            );
            return Ok(None);
        }
    }

    if chunks_written == 0 {
        return Err(missing_header(spec.source_entry_name));
    }

    if result.dropped_rows() > 0 {
        warn!(
            table = spec.source_entry_name,
            dropped_rows = result.dropped_rows(),
            "Dropped rows (duplicates / null keys)"
        );
    }
    log_table_done(&result);
    Ok(Some(result))
}

fn log_preview(spec: &TableSpec, df: &DataFrame) {
    debug!(
        table = spec.output_name,
        columns = ?df.get_column_names(),
        rows = df.height(),
        width = df.width(),
        "Cleaned table preview"
    );
}

fn log_table_done(result: &ProcessingResult) {
    info!(
        table = %result.source_entry_name,
        raw_rows = result.raw_rows,
        clean_rows = result.clean_rows,
        output = %result.output_path.display(),
        "Table saved"
    );
}
