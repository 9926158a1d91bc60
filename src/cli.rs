use crate::cancel::CancelFlag;
use crate::config::ResolvedConfig;
use crate::errors::{AppError, AppResult};
use crate::pipeline::run_pipeline;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing::info;

// CLI metadata constants
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
const APP_ABOUT: &str = env!("CARGO_PKG_DESCRIPTION");

fn build_command() -> Command<'static> {
    Command::new("patient-prep")
        .version(APP_VERSION)
        .author(APP_AUTHOR)
        .about(APP_ABOUT)
        .subcommand(
            Command::new("run")
                .about("Locate the archive, clean every table and write CSV files")
                .after_help("Defaults: archive ../100000-Patients.zip or ./100000-Patients.zip, output ./data, 100000 rows per chunk.\nExample:\n  patient-prep run -a ~/datasets/100000-Patients.zip -o cleaned")
                .arg(
                    Arg::new("archive")
                        .short('a')
                        .long("archive")
                        .help("Candidate archive location; repeat to try several in order")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output-dir")
                        .help("Directory for the cleaned CSV files (created if absent)")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("chunk_size")
                        .short('c')
                        .long("chunk-size")
                        .help("Rows per chunk for large tables")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("toml")
                .about("Run using a TOML configuration file")
                .arg(
                    Arg::new("config")
                        .help("Path to the TOML config file")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
}

/// Parses command-line arguments and runs the cleaning pipeline.
///
/// This function handles two subcommands:
/// - `run`: default configuration with optional overrides for archive, output directory and chunk size
/// - `toml`: configuration loaded from a TOML file
///
/// Both subcommands end in the same workflow: locate the archive, clean each table,
/// write the CSV outputs and print the run summary.
///
/// # Errors
///
/// Returns an error only when the run cannot start or the archive is missing.
/// Per-table failures are part of the printed summary and do not produce an error.
pub fn cli(cancel: &CancelFlag) -> AppResult<()> {
    let cmd = build_command();
    let mut cmd_for_help = cmd.clone();
    let matches = cmd.get_matches();

    match matches.subcommand() {
        Some(("run", sub)) => {
            let config = config_from_run_args(sub);
            run_workflow(&config, cancel)?;
        }
        Some(("toml", sub)) => {
            let config_path = sub
                .get_one::<PathBuf>("config")
                .ok_or_else(|| AppError::InvalidInput("Missing config path".into()))?;

            let config = ResolvedConfig::from_toml_file(config_path)?;
            run_workflow(&config, cancel)?;
        }
        _ => {
            cmd_for_help
                .print_help()
                .map_err(|e| AppError::IoError(format!("Failed to print help: {e}")))?;
        }
    }

    Ok(())
}

fn config_from_run_args(sub: &ArgMatches) -> ResolvedConfig {
    let mut config = ResolvedConfig::default();
    if let Some(archives) = sub.get_many::<PathBuf>("archive") {
        config.archive_candidates = archives.cloned().collect();
    }
    if let Some(output_dir) = sub.get_one::<PathBuf>("output_dir") {
        config.output_dir = output_dir.clone();
    }
    if let Some(&chunk_size) = sub.get_one::<usize>("chunk_size") {
        config.chunk_size = chunk_size;
    }
    config
}

fn run_workflow(config: &ResolvedConfig, cancel: &CancelFlag) -> AppResult<()> {
    info!(
        candidates = config.archive_candidates.len(),
        output_dir = %config.output_dir.display(),
        chunk_size = config.chunk_size,
        "Starting patient data preparation"
    );

    let report = run_pipeline(config, cancel)?;
    report.log_summary();
    println!("{report}");
    if report.is_complete_success() {
        println!(
            "All tables processed successfully. Cleaned CSVs are in: {}",
            config.output_dir.display()
        );
    }

    Ok(())
}
