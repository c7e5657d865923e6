// file: src/utils/validation.rs
// description: run configuration validation helpers
// reference: input validation patterns

use crate::error::{LoadTestError, Result};
use crate::models::ArtifactId;
use std::time::Duration;

pub struct Validator;

impl Validator {
    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(LoadTestError::Config(format!(
                "Invalid URL format: {}",
                url
            )));
        }

        reqwest::Url::parse(url)
            .map_err(|e| LoadTestError::Config(format!("Invalid URL {}: {}", url, e)))?;

        Ok(())
    }

    pub fn validate_artifacts(artifacts: &[ArtifactId]) -> Result<()> {
        if artifacts.is_empty() {
            return Err(LoadTestError::Config(
                "at least one container must be provided".to_string(),
            ));
        }
        Ok(())
    }

    pub fn validate_concurrency(concurrency: usize, artifacts: usize) -> Result<()> {
        if concurrency == 0 {
            return Err(LoadTestError::Config(
                "concurrency must be greater than 0".to_string(),
            ));
        }

        if concurrency > artifacts {
            return Err(LoadTestError::Config(format!(
                "concurrency ({}) cannot exceed the number of containers to process ({})",
                concurrency, artifacts
            )));
        }

        Ok(())
    }

    pub fn validate_timeout(timeout: Duration) -> Result<()> {
        if timeout.is_zero() {
            return Err(LoadTestError::Config(
                "timeout must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn truncate_text(text: &str, max_length: usize) -> String {
        match text.char_indices().nth(max_length) {
            Some((idx, _)) => format!("{}...", &text[..idx]),
            None => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(Validator::validate_url("https://example.com").is_ok());
        assert!(Validator::validate_url("http://localhost:6060").is_ok());
        assert!(Validator::validate_url("localhost:6060").is_err());
        assert!(Validator::validate_url("ftp://example.com").is_err());
        assert!(Validator::validate_url("http://").is_err());
    }

    #[test]
    fn test_validate_concurrency() {
        assert!(Validator::validate_concurrency(1, 1).is_ok());
        assert!(Validator::validate_concurrency(2, 3).is_ok());
        assert!(Validator::validate_concurrency(0, 3).is_err());
        assert!(Validator::validate_concurrency(3, 2).is_err());
    }

    #[test]
    fn test_validate_artifacts() {
        assert!(Validator::validate_artifacts(&[]).is_err());
        assert!(Validator::validate_artifacts(&[ArtifactId::from("a")]).is_ok());
    }

    #[test]
    fn test_validate_timeout() {
        assert!(Validator::validate_timeout(Duration::ZERO).is_err());
        assert!(Validator::validate_timeout(Duration::from_millis(1)).is_ok());
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(
            Validator::truncate_text("this is a very long text", 10),
            "this is a ..."
        );
    }
}
