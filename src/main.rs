use patient_prep::{cancel, cli};
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env).with_target(false).init();

    // The runtime only hosts the Ctrl-C watcher; the pipeline itself runs on this thread
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "Failed to start runtime");
            return ExitCode::FAILURE;
        }
    };
    let cancel_flag = cancel::CancelFlag::new();
    rt.spawn(cancel::watch_ctrl_c(cancel_flag.clone()));

    match cli::cli(&cancel_flag) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
