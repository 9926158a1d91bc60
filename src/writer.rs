use crate::constants::OUTPUT_SEPARATOR;
use crate::errors::{AppError, AppResult};
use polars::prelude::*;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Creates or overwrites `path` with a header row followed by every row of `df`.
///
/// Output is UTF-8, comma separated, without a row-index column. Nulls are
/// written as empty fields.
pub fn write_new(df: &mut DataFrame, path: &Path) -> AppResult<()> {
    let file = File::create(path)
        .map_err(|e| AppError::IoError(format!("Failed to create CSV file {path:?}: {e}")))?;
    write_csv(df, file, path, true)
}

/// Appends the rows of `df` to `path`, writing the header only when `include_header` is set.
///
/// The file is created if it does not exist yet. Each call is one flushed write,
/// so an interrupted run never leaves half a batch behind.
pub fn append_with_optional_header(
    df: &mut DataFrame,
    path: &Path,
    include_header: bool,
) -> AppResult<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            AppError::IoError(format!("Failed to open CSV file {path:?} for append: {e}"))
        })?;
    write_csv(df, file, path, include_header)
}

fn write_csv(df: &mut DataFrame, file: File, path: &Path, include_header: bool) -> AppResult<()> {
    let mut out = BufWriter::new(file);

    CsvWriter::new(&mut out)
        .include_header(include_header)
        .with_separator(OUTPUT_SEPARATOR)
        .finish(df)
        .map_err(|e| AppError::IoError(format!("Failed to write CSV file {path:?}: {e}")))?;

    out.flush()
        .map_err(|e| AppError::IoError(format!("Failed to flush CSV file {path:?}: {e}")))
}
