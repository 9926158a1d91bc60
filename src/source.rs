use crate::errors::{AppError, AppResult};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::read::ZipFile;
use zip::ZipArchive;

/// Returns the first candidate path that exists.
///
/// This is a one-shot existence check with no retries. When none of the
/// candidates exist, the error lists every location that was tried.
pub fn locate_archive(candidates: &[PathBuf]) -> AppResult<PathBuf> {
    for candidate in candidates {
        if candidate.is_file() {
            info!(archive = %candidate.display(), "Found source archive");
            return Ok(candidate.clone());
        }
        debug!(candidate = %candidate.display(), "Archive candidate not found");
    }

    Err(AppError::SourceNotFound {
        tried: candidates.to_vec(),
    })
}

/// The source archive, opened once for the whole run and read sequentially.
pub struct SourceArchive<R> {
    archive: ZipArchive<R>,
    entries: BTreeSet<String>,
}

impl SourceArchive<File> {
    /// Opens the archive at `path`.
    pub fn open(path: &Path) -> AppResult<Self> {
        let file = File::open(path).map_err(|e| {
            AppError::IoError(format!("Failed to open archive {}: {e}", path.display()))
        })?;
        Self::new(file).map_err(|e| match e {
            AppError::ParseError(msg) => {
                AppError::ParseError(format!("{msg} ({})", path.display()))
            }
            other => other,
        })
    }
}

impl<R: Read + Seek> SourceArchive<R> {
    pub fn new(reader: R) -> AppResult<Self> {
        let archive = ZipArchive::new(reader)?;
        let entries = archive.file_names().map(str::to_string).collect();
        Ok(Self { archive, entries })
    }

    /// Whether an entry with exactly this name exists.
    pub fn contains(&self, entry_name: &str) -> bool {
        self.entries.contains(entry_name)
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Opens an entry for streaming decompression.
    pub(crate) fn open_entry(&mut self, entry_name: &str) -> AppResult<ZipFile<'_>> {
        self.archive.by_name(entry_name).map_err(|e| {
            AppError::ParseError(format!("Failed to open entry {entry_name}: {e}"))
        })
    }
}
