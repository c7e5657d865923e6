// file: src/pipeline/progress.rs
// description: live task counters and spinner for a running load test
// reference: uses indicatif for progress display on stderr

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Task-level counts of a run, as opposed to the per-request counters in
/// [`super::Stats`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskCounts {
    pub launched: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub elapsed: Duration,
}

impl TaskCounts {
    pub fn in_flight(&self) -> u64 {
        self.launched
            .saturating_sub(self.succeeded)
            .saturating_sub(self.failed)
    }
}

pub struct DispatchProgress {
    bar: ProgressBar,
    launched: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    start_time: Instant,
}

impl DispatchProgress {
    pub fn new(visible: bool, colored: bool) -> Self {
        let bar = if visible {
            create_spinner(colored)
        } else {
            ProgressBar::hidden()
        };

        Self {
            bar,
            launched: AtomicU64::new(0),
            succeeded: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn hidden() -> Self {
        Self::new(false, false)
    }

    pub fn inc_launched(&self) {
        self.launched.fetch_add(1, Ordering::SeqCst);
        self.update_message();
    }

    pub fn inc_succeeded(&self) {
        self.succeeded.fetch_add(1, Ordering::SeqCst);
        self.update_message();
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
        self.update_message();
    }

    pub fn set_phase(&self, phase: &'static str) {
        self.bar.set_prefix(phase);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn counts(&self) -> TaskCounts {
        TaskCounts {
            launched: self.launched.load(Ordering::SeqCst),
            succeeded: self.succeeded.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            elapsed: self.start_time.elapsed(),
        }
    }

    fn update_message(&self) {
        let counts = self.counts();
        self.bar.set_message(format!(
            "launched: {} | ok: {} | failed: {} | in flight: {}",
            counts.launched,
            counts.succeeded,
            counts.failed,
            counts.in_flight()
        ));
    }
}

impl Drop for DispatchProgress {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_spinner(colored: bool) -> ProgressBar {
    let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    let template = if colored {
        "{spinner:.green} [{elapsed_precise}] {prefix:.cyan.bold} {msg}"
    } else {
        "{spinner} [{elapsed_precise}] {prefix} {msg}"
    };
    bar.set_style(
        ProgressStyle::default_spinner()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}
