// file: src/utils/telemetry.rs
// description: timing helpers for run-level observability
// reference: tracing based operation timing

use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Operation timer for performance tracking
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        debug!("Starting operation: {}", operation);
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn finish_with_count(self, count: u64) -> Duration {
        let elapsed = self.elapsed();
        info!(
            "Completed operation: {} - {} tasks in {:.2}s ({:.2} tasks/sec)",
            self.operation,
            count,
            elapsed.as_secs_f64(),
            if elapsed.as_secs_f64() > 0.0 {
                count as f64 / elapsed.as_secs_f64()
            } else {
                0.0
            }
        );
        elapsed
    }

    pub fn checkpoint(&self, message: &str) {
        let elapsed = self.elapsed();
        info!(
            "Operation checkpoint [{}]: {} at {:.2}s",
            self.operation,
            message,
            elapsed.as_secs_f64()
        );
    }
}
