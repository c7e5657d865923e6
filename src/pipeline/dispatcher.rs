// file: src/pipeline/dispatcher.rs
// description: bounded-concurrency feed loop that drives reporters until the deadline
// reference: semaphore admission with a joinset of spawned tasks

use super::progress::DispatchProgress;
use super::reporter::{Collaborators, Reporter};
use super::stats::{Stats, StatsSnapshot};
use crate::config::RunConfig;
use crate::error::{LoadTestError, Result};
use crate::models::ArtifactId;
use crate::utils::OperationTimer;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

/// Endless round-robin over a non-empty artifact list.
#[derive(Debug, Clone)]
pub struct RoundRobin {
    artifacts: Arc<[ArtifactId]>,
    next: usize,
}

impl RoundRobin {
    pub fn new(artifacts: &[ArtifactId]) -> Self {
        Self {
            artifacts: Arc::from(artifacts),
            next: 0,
        }
    }
}

impl Iterator for RoundRobin {
    type Item = ArtifactId;

    fn next(&mut self) -> Option<Self::Item> {
        let artifact = self.artifacts.get(self.next)?.clone();
        self.next = (self.next + 1) % self.artifacts.len();
        Some(artifact)
    }
}

/// Feeds artifacts round-robin into at most `concurrency` reporter tasks
/// until the run timeout fires, then waits for every admitted task and
/// returns the final counters.
pub struct Dispatcher {
    config: RunConfig,
    collaborators: Collaborators,
    cancel: CancellationToken,
    progress: Arc<DispatchProgress>,
}

impl Dispatcher {
    pub fn new(config: RunConfig, collaborators: Collaborators) -> Self {
        Self {
            config,
            collaborators,
            cancel: CancellationToken::new(),
            progress: Arc::new(DispatchProgress::hidden()),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: DispatchProgress) -> Self {
        self.progress = Arc::new(progress);
        self
    }

    /// Handle that aborts the run when cancelled. Cancelling while the feed
    /// loop waits for a slot fails the run with an admission error.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(self) -> Result<StatsSnapshot> {
        self.config.validate()?;

        let run_id = Uuid::new_v4();
        let span = info_span!("report_run", %run_id);
        self.feed_and_drain().instrument(span).await
    }

    async fn feed_and_drain(self) -> Result<StatsSnapshot> {
        let Dispatcher {
            config,
            collaborators,
            cancel,
            progress,
        } = self;

        info!(
            containers = config.artifacts.len(),
            concurrency = config.concurrency,
            timeout = ?config.timeout,
            delete = config.delete,
            "starting report run"
        );

        let stats = Arc::new(Stats::new());
        let reporter = Arc::new(Reporter::new(
            &config.host,
            config.delete,
            collaborators,
            Arc::clone(&stats),
            cancel.clone(),
        ));
        let semaphore = Arc::new(Semaphore::new(config.concurrency));
        let mut feed = RoundRobin::new(&config.artifacts);
        let mut tasks = JoinSet::new();
        let timer = OperationTimer::new("report run");

        let deadline = tokio::time::sleep(config.timeout);
        tokio::pin!(deadline);

        progress.set_phase("feeding");
        loop {
            let admitted = tokio::select! {
                biased;
                _ = &mut deadline => {
                    debug!("timeout reached, no longer feeding");
                    break;
                }
                admitted = acquire(&semaphore, &cancel) => admitted,
            };

            let permit = match admitted {
                Ok(permit) => permit,
                Err(err) => {
                    error!("aborting report run: {}", err);
                    cancel.cancel();
                    tasks.shutdown().await;
                    progress.finish();
                    return Err(err);
                }
            };

            let Some(artifact) = feed.next() else {
                break;
            };

            let reporter = Arc::clone(&reporter);
            let task_progress = Arc::clone(&progress);
            tasks.spawn(
                async move {
                    let _permit = permit;
                    match reporter.report(&artifact).await {
                        Ok(()) => {
                            debug!(container = %artifact, "completed");
                            task_progress.inc_succeeded();
                        }
                        Err(err) => {
                            error!(container = %artifact, stage = %err.stage(), "{}", err);
                            task_progress.inc_failed();
                        }
                    }
                }
                .in_current_span(),
            );
            progress.inc_launched();

            while let Some(joined) = tasks.try_join_next() {
                log_join_error(joined);
            }
        }

        progress.set_phase("draining");
        timer.checkpoint("feeding stopped, waiting for in-flight reports");
        while let Some(joined) = tasks.join_next().await {
            log_join_error(joined);
        }

        let counts = progress.counts();
        progress.finish();
        if cancel.is_cancelled() {
            error!(
                failed = counts.failed,
                "report run cancelled while draining, discarding counters"
            );
            return Err(LoadTestError::Admission(
                "run cancelled before in-flight reports finished".to_string(),
            ));
        }
        timer.finish_with_count(counts.launched);
        info!(
            launched = counts.launched,
            succeeded = counts.succeeded,
            failed = counts.failed,
            elapsed = ?counts.elapsed,
            "report run finished"
        );

        Ok(stats.snapshot())
    }
}

async fn acquire(
    semaphore: &Arc<Semaphore>,
    cancel: &CancellationToken,
) -> Result<OwnedSemaphorePermit> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LoadTestError::Admission(
            "run cancelled while waiting for a concurrency slot".to_string(),
        )),
        permit = Arc::clone(semaphore).acquire_owned() => {
            permit.map_err(|e| LoadTestError::Admission(e.to_string()))
        }
    }
}

fn log_join_error(joined: std::result::Result<(), JoinError>) {
    if let Err(err) = joined {
        if err.is_panic() {
            error!("report task panicked: {}", err);
        } else {
            warn!("report task did not finish: {}", err);
        }
    }
}
