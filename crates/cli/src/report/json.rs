// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JSON format report output.

use std::io::Write;

use serde_json::{Map, Value, json};
use termcolor::WriteColor;

use crate::engine::Outcome;
use crate::runner::RunReport;

use super::ReportFormatter;

/// JSON format report formatter.
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn to_value(report: &RunReport) -> anyhow::Result<Value> {
        let results = &report.results;

        let coverage = match &report.totals {
            Some(totals) => {
                let mut metrics = Map::new();
                for (metric, counter) in totals.iter() {
                    metrics.insert(
                        metric.to_string(),
                        json!({
                            "covered": counter.covered,
                            "total": counter.total,
                            "pct": counter.percent(),
                        }),
                    );
                }
                Value::Object(metrics)
            }
            None => Value::Null,
        };

        Ok(json!({
            "success": report.verdict.success,
            "duration_ms": report.elapsed.as_millis() as u64,
            "summary": {
                "total": report.units.len(),
                "passed": results.count(Outcome::Passed),
                "failed": results.count(Outcome::Failed),
                "errored": results.count(Outcome::Errored),
                "abandoned": results.abandoned.len(),
            },
            "results": serde_json::to_value(&results.results)?,
            "abandoned": serde_json::to_value(&results.abandoned)?,
            "coverage": coverage,
            "violations": serde_json::to_value(&report.verdict.violations)?,
            "failed_units": serde_json::to_value(&report.verdict.failed_units)?,
        }))
    }
}

impl ReportFormatter for JsonFormatter {
    fn write_report(&self, out: &mut dyn WriteColor, report: &RunReport) -> anyhow::Result<()> {
        let value = Self::to_value(report)?;
        serde_json::to_writer_pretty(&mut *out, &value)?;
        writeln!(out)?;
        Ok(())
    }
}
