// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Text format report output.

use std::io::Write;

use termcolor::{ColorSpec, WriteColor};

use crate::color::scheme;
use crate::coverage::Metric;
use crate::engine::{ExecutionResult, Outcome};
use crate::runner::RunReport;

use super::{ReportFormatter, human_duration};

/// Text format report formatter.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn write_report(&self, out: &mut dyn WriteColor, report: &RunReport) -> anyhow::Result<()> {
        for result in &report.results.results {
            write_unit(out, result)?;
        }
        for id in &report.results.abandoned {
            colored(out, &scheme::advice(), "SKIP  ")?;
            colored(out, &scheme::path(), id.as_str())?;
            writeln!(out, " (abandoned)")?;
        }

        if let Some(totals) = &report.totals {
            writeln!(out)?;
            colored(out, &scheme::heading(), "Coverage:")?;
            writeln!(out)?;
            for (metric, counter) in totals.iter() {
                write!(out, "  {:<11}", metric.as_str())?;
                colored(out, &scheme::number(), &format!("{:>7}%", counter.percent()))?;
                write!(out, " ({}/{})", counter.covered, counter.total)?;
                if let Some(v) = violation_for(report, metric) {
                    write!(out, "  ")?;
                    colored(out, &scheme::fail(), &format!("below {}% threshold", v))?;
                }
                writeln!(out)?;
            }
        }

        let results = &report.results;
        writeln!(out)?;
        colored(out, &scheme::heading(), "Units:")?;
        write!(out, " ")?;
        colored(out, &scheme::pass(), &format!("{} passed", results.count(Outcome::Passed)))?;
        for (outcome, spec) in [(Outcome::Failed, scheme::fail()), (Outcome::Errored, scheme::errored())] {
            let n = results.count(outcome);
            if n > 0 {
                write!(out, ", ")?;
                colored(out, &spec, &format!("{n} {outcome}"))?;
            }
        }
        if !results.abandoned.is_empty() {
            write!(out, ", {} abandoned", results.abandoned.len())?;
        }
        writeln!(out, ", {} total", report.units.len())?;
        colored(out, &scheme::heading(), "Time:")?;
        writeln!(out, "  {}", human_duration(report.elapsed))?;
        Ok(())
    }
}

fn write_unit(out: &mut dyn WriteColor, result: &ExecutionResult) -> anyhow::Result<()> {
    let (label, spec) = match result.outcome {
        Outcome::Passed => ("PASS  ", scheme::pass()),
        Outcome::Failed => ("FAIL  ", scheme::fail()),
        Outcome::Errored => ("ERROR ", scheme::errored()),
    };
    colored(out, &spec, label)?;
    colored(out, &scheme::path(), result.unit_id.as_str())?;
    writeln!(out, " ({})", human_duration(result.duration))?;
    if let Some(failure) = &result.failure {
        colored(out, &scheme::advice(), &format!("  {}", failure.summary()))?;
        writeln!(out)?;
    }
    Ok(())
}

fn violation_for(report: &RunReport, metric: Metric) -> Option<f64> {
    report
        .verdict
        .violations
        .iter()
        .find(|v| v.metric == metric)
        .map(|v| v.required)
}

fn colored(out: &mut dyn WriteColor, spec: &ColorSpec, text: &str) -> std::io::Result<()> {
    out.set_color(spec)?;
    write!(out, "{}", text)?;
    out.reset()
}

#[cfg(test)]
#[path = "text_tests.rs"]
mod tests;
