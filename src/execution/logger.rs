//! Installation log - the operator-facing lifecycle messages

use tracing::{error, info};

/// Append-only sink for installation lifecycle messages
pub trait InstallLogger: Send + Sync {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
}

/// Emits lifecycle messages as `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl InstallLogger for TracingLogger {
    fn info(&self, message: &str) {
        info!(target: "installer::lifecycle", "{}", message);
    }

    fn error(&self, message: &str) {
        error!(target: "installer::lifecycle", "{}", message);
    }
}
