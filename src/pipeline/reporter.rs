// file: src/pipeline/reporter.rs
// description: per-artifact report workflow against the clair indexer and matcher
// reference: https://quay.github.io/clair/reference/api.html

use super::stats::Stats;
use crate::auth::TokenSource;
use crate::config::HttpConfig;
use crate::error::{LoadTestError, Result, StageError};
use crate::manifest::ManifestGenerator;
use crate::models::{ArtifactId, IndexReportResponse, Stage};
use crate::utils::Validator;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const INDEX_REPORT_PATH: &str = "/indexer/api/v1/index_report";
const VULNERABILITY_REPORT_PATH: &str = "/matcher/api/v1/vulnerability_report";
const MAX_ERROR_BODY_CHARS: usize = 256;

/// Shared handles every pipeline run needs. The HTTP client is cloned
/// cheaply and reuses one connection pool.
#[derive(Clone)]
pub struct Collaborators {
    pub client: Client,
    pub manifests: Arc<dyn ManifestGenerator>,
    pub tokens: Arc<dyn TokenSource>,
}

pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.request_timeout)
        .connect_timeout(config.connect_timeout)
        .pool_idle_timeout(config.pool_idle_timeout)
        .build()
        .map_err(|e| LoadTestError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Runs the report workflow for one artifact at a time and records request
/// latency into the run's [`Stats`].
pub struct Reporter {
    host: String,
    delete: bool,
    client: Client,
    manifests: Arc<dyn ManifestGenerator>,
    tokens: Arc<dyn TokenSource>,
    stats: Arc<Stats>,
    cancel: CancellationToken,
}

impl Reporter {
    pub fn new(
        host: &str,
        delete: bool,
        collaborators: Collaborators,
        stats: Arc<Stats>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            host: host.trim_end_matches('/').to_string(),
            delete,
            client: collaborators.client,
            manifests: collaborators.manifests,
            tokens: collaborators.tokens,
            stats,
            cancel,
        }
    }

    /// Manifest, token, index report, vulnerability report and, when
    /// enabled, deletion of the index report. The first failing stage ends
    /// the run for this artifact.
    pub async fn report(&self, artifact: &ArtifactId) -> std::result::Result<(), StageError> {
        let manifest = self
            .guard(Stage::Manifest, async {
                self.manifests
                    .generate(artifact)
                    .await
                    .map_err(StageError::from)
            })
            .await?;
        debug!(container = %artifact, bytes = manifest.len(), "generated manifest");

        let token = self.tokens.token()?;

        let hash = self
            .guard(
                Stage::IndexReport,
                self.create_index_report(manifest, &token),
            )
            .await?;
        debug!(container = %artifact, hash = %hash, "created index report");

        self.guard(
            Stage::VulnerabilityReport,
            self.get_vulnerability_report(&hash, &token),
        )
        .await?;

        if self.delete {
            self.guard(
                Stage::DeleteIndexReport,
                self.delete_index_report(&hash, &token),
            )
            .await?;
        }

        Ok(())
    }

    async fn create_index_report(
        &self,
        manifest: Vec<u8>,
        token: &str,
    ) -> std::result::Result<String, StageError> {
        let url = format!("{}{}", self.host, INDEX_REPORT_PATH);

        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .body(manifest)
            .send()
            .await
            .map_err(|source| StageError::Transport {
                stage: Stage::IndexReport,
                source,
            })?;

        let status = response.status();
        self.stats
            .record_index_report(started.elapsed(), status == StatusCode::CREATED);

        let response = expect_status(response, Stage::IndexReport, StatusCode::CREATED).await?;

        let report: IndexReportResponse =
            response.json().await.map_err(|source| StageError::Decode {
                stage: Stage::IndexReport,
                source,
            })?;

        Ok(report.hash)
    }

    async fn get_vulnerability_report(
        &self,
        hash: &str,
        token: &str,
    ) -> std::result::Result<(), StageError> {
        let url = format!("{}{}/{}", self.host, VULNERABILITY_REPORT_PATH, hash);

        let started = Instant::now();
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| StageError::Transport {
                stage: Stage::VulnerabilityReport,
                source,
            })?;

        let status = response.status();
        self.stats
            .record_vulnerability_report(started.elapsed(), status == StatusCode::OK);

        let response = expect_status(response, Stage::VulnerabilityReport, StatusCode::OK).await?;

        // Drain the body so the connection goes back to the pool.
        let body = response.bytes().await.map_err(|source| StageError::Decode {
            stage: Stage::VulnerabilityReport,
            source,
        })?;
        debug!(hash = %hash, bytes = body.len(), "got vulnerability report");

        Ok(())
    }

    async fn delete_index_report(
        &self,
        hash: &str,
        token: &str,
    ) -> std::result::Result<(), StageError> {
        let url = format!("{}{}/{}", self.host, INDEX_REPORT_PATH, hash);

        debug!(hash = %hash, "deleting index report");
        let response = self
            .client
            .delete(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|source| StageError::Transport {
                stage: Stage::DeleteIndexReport,
                source,
            })?;

        expect_status(response, Stage::DeleteIndexReport, StatusCode::NO_CONTENT).await?;
        Ok(())
    }

    /// Races a stage against the run's cancellation token.
    async fn guard<T, F>(&self, stage: Stage, stage_future: F) -> std::result::Result<T, StageError>
    where
        F: Future<Output = std::result::Result<T, StageError>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StageError::Cancelled { stage }),
            result = stage_future => result,
        }
    }
}

async fn expect_status(
    response: Response,
    stage: Stage,
    expected: StatusCode,
) -> std::result::Result<Response, StageError> {
    let status = response.status();
    if status == expected {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());

    Err(StageError::UnexpectedStatus {
        stage,
        status,
        expected,
        body: Validator::truncate_text(body.trim(), MAX_ERROR_BODY_CHARS),
    })
}
