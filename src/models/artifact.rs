// file: src/models/artifact.rs
// description: artifact identifier model and list parsing
// reference: internal data structures

use std::fmt;
use std::sync::Arc;

/// Opaque name of a unit of work, usually a container reference such as
/// `ubuntu:latest`. Cheap to clone into spawned tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactId(Arc<str>);

impl ArtifactId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits a comma-separated list, trimming whitespace and dropping blank
    /// entries. Order is preserved.
    pub fn parse_list(list: &str) -> Vec<Self> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::new)
            .collect()
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArtifactId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ArtifactId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}
