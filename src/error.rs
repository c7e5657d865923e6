// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use crate::models::Stage;
use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LoadTestError>;

/// Errors that escape a dispatcher run. Everything else stays inside the
/// task that produced it.
#[derive(Error, Debug)]
pub enum LoadTestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Admission error: {0}")]
    Admission(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure of a single pipeline stage for one artifact.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("could not generate manifest: {0}")]
    Manifest(#[from] ManifestError),

    #[error("could not create token: {0}")]
    Token(#[from] TokenError),

    #[error("{stage} request failed: {source}")]
    Transport {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    #[error("{stage} returned unexpected status {status} (expected {expected}), body: {body}")]
    UnexpectedStatus {
        stage: Stage,
        status: StatusCode,
        expected: StatusCode,
        body: String,
    },

    #[error("could not decode {stage} response: {source}")]
    Decode {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    #[error("{stage} cancelled")]
    Cancelled { stage: Stage },
}

impl StageError {
    pub fn stage(&self) -> Stage {
        match self {
            StageError::Manifest(_) => Stage::Manifest,
            StageError::Token(_) => Stage::Token,
            StageError::Transport { stage, .. }
            | StageError::UnexpectedStatus { stage, .. }
            | StageError::Decode { stage, .. }
            | StageError::Cancelled { stage } => *stage,
        }
    }
}

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Exit {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("manifest for {0} is empty")]
    Empty(String),
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("pre-shared key is not valid base64: {0}")]
    InvalidKey(#[from] base64::DecodeError),

    #[error("pre-shared key is empty")]
    EmptyKey,

    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_reports_stage() {
        let err = StageError::UnexpectedStatus {
            stage: Stage::IndexReport,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            expected: StatusCode::CREATED,
            body: "indexer unavailable".to_string(),
        };
        assert_eq!(err.stage(), Stage::IndexReport);
        assert!(err.to_string().contains("500"));

        let err = StageError::from(TokenError::EmptyKey);
        assert_eq!(err.stage(), Stage::Token);
    }

    #[test]
    fn test_config_error_message() {
        let err = LoadTestError::Config("concurrency too high".to_string());
        assert_eq!(err.to_string(), "Configuration error: concurrency too high");
    }
}
