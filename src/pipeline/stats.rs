// file: src/pipeline/stats.rs
// description: lock-free request counters and latency totals for a load run
// reference: atomic accumulation shared across spawned tasks

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Final counters of a run. Plain data, safe to serialize once the run is
/// over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_index_report_requests: u64,
    pub total_index_report_request_latency_milliseconds: u64,
    pub non_2xx_index_report_responses: u64,
    pub total_vulnerability_report_requests: u64,
    pub total_vulnerability_report_request_latency_milliseconds: u64,
    pub non_2xx_vulnerability_report_responses: u64,
    pub average_index_report_request_latency_milliseconds: f64,
    pub average_vulnerability_report_request_latency_milliseconds: f64,
}

impl StatsSnapshot {
    pub fn index_report_success_rate(&self) -> f64 {
        success_rate(
            self.total_index_report_requests,
            self.non_2xx_index_report_responses,
        )
    }

    pub fn vulnerability_report_success_rate(&self) -> f64 {
        success_rate(
            self.total_vulnerability_report_requests,
            self.non_2xx_vulnerability_report_responses,
        )
    }

    pub fn total_requests(&self) -> u64 {
        self.total_index_report_requests + self.total_vulnerability_report_requests
    }
}

fn average(total_ms: u64, count: u64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    total_ms as f64 / count as f64
}

fn success_rate(total: u64, failed: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (total.saturating_sub(failed) as f64 / total as f64) * 100.0
}

/// Counters shared by every task of one run. Each field is updated
/// independently with an atomic add.
#[derive(Debug, Default)]
pub struct Stats {
    index_report_requests: AtomicU64,
    index_report_latency_ms: AtomicU64,
    index_report_failures: AtomicU64,
    vulnerability_report_requests: AtomicU64,
    vulnerability_report_latency_ms: AtomicU64,
    vulnerability_report_failures: AtomicU64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_index_report(&self, latency: Duration, success: bool) {
        self.index_report_latency_ms
            .fetch_add(as_millis(latency), Ordering::SeqCst);
        self.index_report_requests.fetch_add(1, Ordering::SeqCst);
        if !success {
            self.index_report_failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn record_vulnerability_report(&self, latency: Duration, success: bool) {
        self.vulnerability_report_latency_ms
            .fetch_add(as_millis(latency), Ordering::SeqCst);
        self.vulnerability_report_requests
            .fetch_add(1, Ordering::SeqCst);
        if !success {
            self.vulnerability_report_failures
                .fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Reads every counter. Only meaningful once all recording tasks have
    /// been joined; the dispatcher calls it after draining.
    pub fn snapshot(&self) -> StatsSnapshot {
        let index_requests = self.index_report_requests.load(Ordering::SeqCst);
        let index_latency = self.index_report_latency_ms.load(Ordering::SeqCst);
        let vuln_requests = self.vulnerability_report_requests.load(Ordering::SeqCst);
        let vuln_latency = self
            .vulnerability_report_latency_ms
            .load(Ordering::SeqCst);

        StatsSnapshot {
            total_index_report_requests: index_requests,
            total_index_report_request_latency_milliseconds: index_latency,
            non_2xx_index_report_responses: self.index_report_failures.load(Ordering::SeqCst),
            total_vulnerability_report_requests: vuln_requests,
            total_vulnerability_report_request_latency_milliseconds: vuln_latency,
            non_2xx_vulnerability_report_responses: self
                .vulnerability_report_failures
                .load(Ordering::SeqCst),
            average_index_report_request_latency_milliseconds: average(
                index_latency,
                index_requests,
            ),
            average_vulnerability_report_request_latency_milliseconds: average(
                vuln_latency,
                vuln_requests,
            ),
        }
    }
}

fn as_millis(latency: Duration) -> u64 {
    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    #[test]
    fn test_empty_snapshot() {
        let stats = Stats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
        assert_eq!(stats.snapshot().index_report_success_rate(), 0.0);
    }

    #[test]
    fn test_failures_only_touch_their_stage() {
        let stats = Stats::new();
        stats.record_index_report(Duration::from_millis(40), true);
        stats.record_index_report(Duration::from_millis(60), false);
        stats.record_vulnerability_report(Duration::from_millis(10), true);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_index_report_requests, 2);
        assert_eq!(snapshot.total_index_report_request_latency_milliseconds, 100);
        assert_eq!(snapshot.non_2xx_index_report_responses, 1);
        assert_eq!(snapshot.total_vulnerability_report_requests, 1);
        assert_eq!(snapshot.non_2xx_vulnerability_report_responses, 0);
        assert_eq!(snapshot.average_index_report_request_latency_milliseconds, 50.0);
        assert_eq!(snapshot.index_report_success_rate(), 50.0);
        assert_eq!(snapshot.vulnerability_report_success_rate(), 100.0);
        assert_eq!(snapshot.total_requests(), 3);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let stats = Arc::new(Stats::new());
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for i in 0..1_000 {
                        stats.record_index_report(Duration::from_millis(1), i % 10 != 0);
                        stats.record_vulnerability_report(Duration::from_millis(2), t != 0);
                    }
                })
            })
            .collect();

        for handle in threads {
            handle.join().unwrap();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_index_report_requests, 8_000);
        assert_eq!(snapshot.total_index_report_request_latency_milliseconds, 8_000);
        assert_eq!(snapshot.non_2xx_index_report_responses, 800);
        assert_eq!(snapshot.total_vulnerability_report_requests, 8_000);
        assert_eq!(
            snapshot.total_vulnerability_report_request_latency_milliseconds,
            16_000
        );
        assert_eq!(snapshot.non_2xx_vulnerability_report_responses, 1_000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_tasks_are_not_lost() {
        let stats = Arc::new(Stats::new());
        let tasks = (0..500).map(|_| {
            let stats = Arc::clone(&stats);
            tokio::spawn(async move {
                stats.record_index_report(Duration::from_millis(3), true);
            })
        });

        for result in futures::future::join_all(tasks).await {
            result.unwrap();
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total_index_report_requests, 500);
        assert_eq!(snapshot.total_index_report_request_latency_milliseconds, 1_500);
    }

    #[test]
    fn test_snapshot_serializes_counter_names() {
        let stats = Stats::new();
        stats.record_vulnerability_report(Duration::from_millis(7), false);

        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["total_vulnerability_report_requests"], 1);
        assert_eq!(json["non_2xx_vulnerability_report_responses"], 1);
        assert_eq!(json["total_index_report_requests"], 0);
    }
}
