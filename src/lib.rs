//! patient-prep library
//!
//! This crate provides the core functionality for the `patient-prep` binary.
//! Keep the crate root minimal; implementation and tests live in their modules.
//!
//! ## Overview
//!
//! The library turns the four tab-delimited tables of the patient archive into
//! cleaned CSV files:
//!
//! - [`source`] - Locates the archive among candidate paths and opens it
//! - [`reader`] - Decodes archive entries as whole tables or bounded chunks
//! - [`cleaner`] - Applies the per-table cleaning policy to one batch
//! - [`writer`] - Writes and appends cleaned batches as CSV
//! - [`pipeline`] - Drives every table to completion and collects statistics
//! - [`models`] - Table registry and cleaning policies
//! - [`report`] - Per-table results and the run summary
//! - [`cli`] - Command-line interface
//! - [`errors`] - Error types used throughout the application
//!
//! ## Example Usage
//!
//! ```no_run
//! use patient_prep::{cancel::CancelFlag, config::ResolvedConfig, errors::AppResult, pipeline};
//!
//! # fn example() -> AppResult<()> {
//! let config = ResolvedConfig::default();
//! let report = pipeline::run_pipeline(&config, &CancelFlag::new())?;
//! for result in &report.results {
//!     println!("{}: {} -> {}", result.source_entry_name, result.raw_rows, result.clean_rows);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod cleaner;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod source;
pub mod utils;
pub mod writer;
