// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod auth;
pub mod config;
pub mod error;
pub mod exporter;
pub mod manifest;
pub mod models;
pub mod pipeline;
pub mod utils;

pub use auth::{PskTokenSource, TokenSource};
pub use config::{AuthConfig, Config, HttpConfig, ManifestConfig, ReportConfig, RunConfig};
pub use error::{LoadTestError, ManifestError, Result, StageError, TokenError};
pub use exporter::{JsonExporter, OutputFormat, TextExporter};
pub use manifest::{ClairctlManifest, ManifestGenerator};
pub use models::{ArtifactId, Stage};
pub use pipeline::{
    Collaborators, DispatchProgress, Dispatcher, Reporter, Stats, StatsSnapshot, build_client,
};
pub use utils::{OperationTimer, Validator};
