use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The source archive was not found in any candidate location
    #[error("Source archive not found. Tried:\n{}", format_candidates(.tried))]
    SourceNotFound { tried: Vec<PathBuf> },
    /// Failed to decode archive, TSV or DataFrame content
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Invalid configuration or command-line input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// IO operation failed
    #[error("IO error: {0}")]
    IoError(String),
}

fn format_candidates(tried: &[PathBuf]) -> String {
    tried
        .iter()
        .map(|p| format!("  {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n")
}

// Conversion implementations for common errors
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<zip::result::ZipError> for AppError {
    fn from(err: zip::result::ZipError) -> Self {
        AppError::ParseError(format!("Zip archive error: {err}"))
    }
}

impl From<polars::error::PolarsError> for AppError {
    fn from(err: polars::error::PolarsError) -> Self {
        AppError::ParseError(format!("DataFrame error: {err}"))
    }
}

// Custom type alias for Results in this application
pub type AppResult<T> = Result<T, AppError>;
