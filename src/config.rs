use crate::constants::{
    ARCHIVE_FILE_NAME, DEFAULT_CHUNK_SIZE, DEFAULT_OUTPUT_DIR, DEFAULT_PROGRESS_EVERY,
};
use crate::errors::{AppError, AppResult};
use crate::models::{SizeClass, TableKind, TableSpec};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved configuration with all values filled in (no Options).
///
/// This struct represents the pipeline defaults and can be deserialized by the TOML
/// loader. All fields have concrete values, making it safe to access directly without unwrapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolvedConfig {
    /// Locations tried, in order, when looking for the source archive
    pub archive_candidates: Vec<PathBuf>,
    /// Directory receiving the cleaned CSV files (created if absent)
    pub output_dir: PathBuf,

    // Processing
    /// Rows per chunk for tables read in chunks.
    /// This bounds the peak in-memory DataFrame size for large tables.
    pub chunk_size: usize,
    /// Log a progress line every this many chunks.
    pub progress_every: usize,
    /// Entry names read in chunks instead of as a whole table.
    pub large_tables: Vec<String>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            archive_candidates: vec![
                Path::new("..").join(ARCHIVE_FILE_NAME),
                PathBuf::from(ARCHIVE_FILE_NAME),
            ],
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_every: DEFAULT_PROGRESS_EVERY,
            large_tables: TableKind::ALL
                .iter()
                .map(|kind| kind.spec())
                .filter(|spec| spec.size_class == SizeClass::Large)
                .map(|spec| spec.source_entry_name.to_string())
                .collect(),
        }
    }
}

impl ResolvedConfig {
    /// Size class for a table under this configuration.
    pub fn size_class(&self, spec: &TableSpec) -> SizeClass {
        if self
            .large_tables
            .iter()
            .any(|name| name == spec.source_entry_name)
        {
            SizeClass::Large
        } else {
            SizeClass::Standard
        }
    }

    /// Checks the invariants every pipeline run relies on.
    pub fn validate(&self) -> AppResult<()> {
        if self.chunk_size == 0 {
            return Err(AppError::InvalidInput(
                "Chunk size must be greater than 0".into(),
            ));
        }
        if self.progress_every == 0 {
            return Err(AppError::InvalidInput(
                "Progress interval must be greater than 0".into(),
            ));
        }
        if self.archive_candidates.is_empty() {
            return Err(AppError::InvalidInput(
                "At least one archive candidate path is required".into(),
            ));
        }
        if let Some(unknown) = self
            .large_tables
            .iter()
            .find(|name| TableSpec::for_entry(name).is_none())
        {
            return Err(AppError::InvalidInput(format!(
                "Unknown table in large_tables: {unknown}"
            )));
        }
        Ok(())
    }

    /// Loads and validates configuration from a TOML file.
    ///
    /// Every key is optional and falls back to [`ResolvedConfig::default`].
    /// Unknown keys are rejected to prevent typos from being silently ignored.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the TOML is malformed, unknown keys are present,
    /// `chunk_size`/`progress_every` are not positive, the candidate list is empty,
    /// or `large_tables` names a table that does not exist.
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            AppError::IoError(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;
        let config: ResolvedConfig = toml::from_str(&contents)
            .map_err(|e| AppError::InvalidInput(format!("Failed to parse config: {e}")))?;

        config.validate()?;

        Ok(config)
    }
}
