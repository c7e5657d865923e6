// file: src/exporter/mod.rs
// description: run summary exporters
// reference: internal module structure

pub mod json;
pub mod text;

pub use json::JsonExporter;
pub use text::TextExporter;

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON document
    #[default]
    Json,
    /// Human-readable summary
    Text,
}
