//! Progress notifications towards the scheduler host

use tracing::info;

/// Receives free-text progress updates while a run executes
pub trait StatusNotifier: Send + Sync {
    fn on_status_changed(&self, message: &str);
}

/// Default notifier: emits each update as a tracing event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatusNotifier;

impl StatusNotifier for TracingStatusNotifier {
    fn on_status_changed(&self, message: &str) {
        info!(status = %message, "Job status changed");
    }
}
