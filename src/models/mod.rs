// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod artifact;
pub mod report;

pub use artifact::ArtifactId;
pub use report::{IndexReportResponse, Stage};
