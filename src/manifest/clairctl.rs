// file: src/manifest/clairctl.rs
// description: manifest generation by shelling out to clairctl
// reference: https://docs.rs/tokio/latest/tokio/process

use super::ManifestGenerator;
use crate::config::ManifestConfig;
use crate::error::ManifestError;
use crate::models::ArtifactId;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs `<program> <args..> <artifact>` and returns its stdout.
#[derive(Debug, Clone)]
pub struct ClairctlManifest {
    program: String,
    args: Vec<String>,
}

impl ClairctlManifest {
    pub fn new(config: &ManifestConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }
}

#[async_trait]
impl ManifestGenerator for ClairctlManifest {
    async fn generate(&self, artifact: &ArtifactId) -> Result<Vec<u8>, ManifestError> {
        debug!(
            artifact = %artifact,
            program = %self.program,
            args = ?self.args,
            "getting manifest"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(artifact.as_str())
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ManifestError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ManifestError::Exit {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if output.stdout.is_empty() {
            return Err(ManifestError::Empty(artifact.to_string()));
        }

        debug!(artifact = %artifact, bytes = output.stdout.len(), "got manifest");
        Ok(output.stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn generator(program: &str, args: &[&str]) -> ClairctlManifest {
        ClairctlManifest::new(&ManifestConfig {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        })
    }

    #[tokio::test]
    async fn test_artifact_is_passed_as_last_argument() {
        // sh -c binds the trailing argument to $0
        let manifest = generator("sh", &["-c", "printf '{\"image\":\"%s\"}' \"$0\""]);
        let body = manifest
            .generate(&ArtifactId::from("ubuntu:latest"))
            .await
            .unwrap();
        assert_eq!(body, br#"{"image":"ubuntu:latest"}"#);
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let manifest = generator("sh", &["-c", "echo boom >&2; exit 3"]);
        let err = manifest
            .generate(&ArtifactId::from("ubuntu:latest"))
            .await
            .unwrap_err();
        match err {
            ManifestError::Exit { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_a_spawn_error() {
        let manifest = generator("clairctl-does-not-exist", &["manifest"]);
        let err = manifest.generate(&ArtifactId::from("x")).await.unwrap_err();
        assert!(matches!(err, ManifestError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_empty_output_is_an_error() {
        let manifest = generator("true", &[]);
        let err = manifest.generate(&ArtifactId::from("x")).await.unwrap_err();
        assert!(matches!(err, ManifestError::Empty(_)));
    }
}
