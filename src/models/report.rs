// file: src/models/report.rs
// description: wire types and stage names for the report pipeline
// reference: clair indexer and matcher v1 api

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the per-artifact report pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Manifest,
    Token,
    IndexReport,
    VulnerabilityReport,
    DeleteIndexReport,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Manifest => "manifest",
            Stage::Token => "token",
            Stage::IndexReport => "index_report",
            Stage::VulnerabilityReport => "vulnerability_report",
            Stage::DeleteIndexReport => "delete_index_report",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a `201 Created` from `POST /indexer/api/v1/index_report`.
/// Only the handle is needed; the rest of the report is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexReportResponse {
    #[serde(rename = "manifest_hash")]
    pub hash: String,
}
