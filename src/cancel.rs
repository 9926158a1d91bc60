use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Shared stop request, checked by the pipeline between batches.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Waits for Ctrl-C and raises `flag`.
///
/// A second Ctrl-C is a hard abort: the process exits with status 130 at once,
/// even in the middle of a batch write, so the last output file may end in a
/// truncated row. Only the first Ctrl-C leaves every output file complete.
pub async fn watch_ctrl_c(flag: CancelFlag) {
    if tokio::signal::ctrl_c().await.is_err() {
        warn!("Could not listen for Ctrl-C; interrupts will not stop the run cleanly");
        return;
    }
    warn!("Interrupt received, stopping after the current batch (press Ctrl-C again to abort)");
    flag.cancel();

    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Second interrupt received, aborting");
        std::process::exit(130);
    }
}
