// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Run reports.
//!
//! The text and JSON formatters render a [`RunReport`] for people and
//! tools. The coverage summary artifact is written next to other coverage
//! output for external report writers.

mod json;
mod summary;
mod text;

use std::time::Duration;

use termcolor::WriteColor;

use crate::cli::OutputFormat;
use crate::runner::RunReport;

pub use json::JsonFormatter;
pub use summary::{coverage_summary, write_coverage_summary};
pub use text::TextFormatter;

/// Trait for rendering a finished run.
pub trait ReportFormatter {
    /// Write the report. Plain writers simply ignore color calls.
    fn write_report(&self, out: &mut dyn WriteColor, report: &RunReport) -> anyhow::Result<()>;
}

/// Render `report` in `format`.
pub fn write_report(
    format: OutputFormat,
    out: &mut dyn WriteColor,
    report: &RunReport,
) -> anyhow::Result<()> {
    let formatter: Box<dyn ReportFormatter> = match format {
        OutputFormat::Text => Box::new(TextFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    };
    formatter.write_report(out, report)
}

/// Helper to convert durations to human-readable format.
pub fn human_duration(duration: Duration) -> String {
    let ms = duration.as_millis();
    if ms >= 1000 {
        format!("{:.2} s", duration.as_secs_f64())
    } else {
        format!("{} ms", ms)
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
