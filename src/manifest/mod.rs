// file: src/manifest/mod.rs
// description: manifest generation seam and default clairctl implementation
// reference: internal module structure

mod clairctl;

pub use clairctl::ClairctlManifest;

use crate::error::ManifestError;
use crate::models::ArtifactId;
use async_trait::async_trait;

/// Produces the manifest body submitted to the indexer for an artifact.
#[async_trait]
pub trait ManifestGenerator: Send + Sync {
    async fn generate(&self, artifact: &ArtifactId) -> Result<Vec<u8>, ManifestError>;
}
