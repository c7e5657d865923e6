// file: src/exporter/text.rs
// description: coloured human-readable run summary

use crate::pipeline::StatsSnapshot;
use crate::utils::logging::{format_error, format_info, format_success, format_warning};

#[derive(Debug, Clone, Copy)]
pub struct TextExporter {
    colored: bool,
}

#[derive(Debug, Clone, Copy)]
enum Mark {
    Info,
    Success,
    Warning,
    Error,
}

impl TextExporter {
    pub fn new(colored: bool) -> Self {
        Self { colored }
    }

    pub fn render(&self, snapshot: &StatsSnapshot) -> String {
        let mut lines = vec![self.mark(Mark::Info, "Report run summary")];

        lines.push(self.stage_line(
            "index reports",
            snapshot.total_index_report_requests,
            snapshot.non_2xx_index_report_responses,
            snapshot.average_index_report_request_latency_milliseconds,
            snapshot.index_report_success_rate(),
        ));
        lines.push(self.stage_line(
            "vulnerability reports",
            snapshot.total_vulnerability_report_requests,
            snapshot.non_2xx_vulnerability_report_responses,
            snapshot.average_vulnerability_report_request_latency_milliseconds,
            snapshot.vulnerability_report_success_rate(),
        ));

        lines.join("\n") + "\n"
    }

    fn stage_line(
        &self,
        name: &str,
        total: u64,
        failed: u64,
        avg_ms: f64,
        success_rate: f64,
    ) -> String {
        let msg = format!(
            "{}: {} requests, {} non-2xx, avg {:.1}ms, {:.1}% ok",
            name, total, failed, avg_ms, success_rate
        );
        let mark = if total == 0 {
            Mark::Warning
        } else if failed == 0 {
            Mark::Success
        } else {
            Mark::Error
        };
        self.mark(mark, &msg)
    }

    fn mark(&self, mark: Mark, msg: &str) -> String {
        if self.colored {
            return match mark {
                Mark::Info => format_info(msg),
                Mark::Success => format_success(msg),
                Mark::Warning => format_warning(msg),
                Mark::Error => format_error(msg),
            };
        }
        let symbol = match mark {
            Mark::Info => "ℹ",
            Mark::Success => "✓",
            Mark::Warning => "⚠",
            Mark::Error => "✗",
        };
        format!("{} {}", symbol, msg)
    }
}
