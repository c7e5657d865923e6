// file: src/exporter/json.rs
// description: json export of the final run counters

use crate::error::Result;
use crate::pipeline::StatsSnapshot;
use std::io::Write;

#[derive(Debug, Clone, Copy)]
pub struct JsonExporter {
    pretty: bool,
}

impl JsonExporter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Writes the snapshot followed by a newline.
    pub fn write<W: Write>(&self, snapshot: &StatsSnapshot, mut writer: W) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, snapshot)?;
        } else {
            serde_json::to_writer(&mut writer, snapshot)?;
        }
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
