// file: src/pipeline/fakes.rs
// description: in-memory collaborators for pipeline and dispatcher tests
// reference: trait-object substitution at the manifest and token seams

use super::Collaborators;
use crate::auth::TokenSource;
use crate::error::{ManifestError, TokenError};
use crate::manifest::ManifestGenerator;
use crate::models::ArtifactId;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "test-token";

/// Returns the artifact name as the manifest body and remembers the call
/// order. Artifacts listed in `failing` fail generation.
#[derive(Default)]
pub struct EchoManifest {
    calls: Mutex<Vec<ArtifactId>>,
    failing: Vec<ArtifactId>,
}

impl EchoManifest {
    pub fn failing_for(failing: &[&str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: failing.iter().copied().map(ArtifactId::from).collect(),
        }
    }

    pub fn calls(&self) -> Vec<ArtifactId> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ManifestGenerator for EchoManifest {
    async fn generate(&self, artifact: &ArtifactId) -> Result<Vec<u8>, ManifestError> {
        self.calls.lock().unwrap().push(artifact.clone());
        if self.failing.contains(artifact) {
            return Err(ManifestError::Empty(artifact.to_string()));
        }
        Ok(artifact.as_str().as_bytes().to_vec())
    }
}

pub struct StaticToken;

impl TokenSource for StaticToken {
    fn token(&self) -> Result<String, TokenError> {
        Ok(TOKEN.to_string())
    }
}

pub struct BrokenToken;

impl TokenSource for BrokenToken {
    fn token(&self) -> Result<String, TokenError> {
        Err(TokenError::EmptyKey)
    }
}

pub fn collaborators(manifests: Arc<EchoManifest>) -> Collaborators {
    Collaborators {
        client: reqwest::Client::new(),
        manifests,
        tokens: Arc::new(StaticToken),
    }
}
