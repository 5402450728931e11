// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Threshold gate: turns run totals and unit outcomes into a verdict.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::ThresholdConfig;
use crate::coverage::{CoverageTotals, Metric};
use crate::discovery::UnitId;
use crate::error::ExitCode;

/// A metric below its configured minimum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub metric: Metric,
    /// Displayed percentage (truncated at two decimals).
    pub actual: f64,
    pub required: f64,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} coverage {}% is below the {}% threshold",
            self.metric, self.actual, self.required
        )
    }
}

/// Final decision for a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunVerdict {
    pub success: bool,
    /// Displayed percentage for every metric (empty without coverage).
    pub per_metric_percent: BTreeMap<Metric, f64>,
    /// Ordered statements, branches, functions, lines.
    pub violations: Vec<Violation>,
    /// Units that did not pass, in discovery order.
    pub failed_units: Vec<UnitId>,
    /// Units dropped by cancellation.
    pub abandoned: usize,
}

/// Compare totals against thresholds.
///
/// Each configured metric passes when `covered / total * 100 >= minimum`,
/// compared exactly. Metrics without a minimum are not checked.
pub fn evaluate(totals: &CoverageTotals, thresholds: &ThresholdConfig) -> RunVerdict {
    let per_metric_percent = totals.iter().map(|(m, c)| (m, c.percent())).collect();

    let violations: Vec<Violation> = thresholds
        .iter()
        .filter_map(|(metric, required)| {
            let counter = totals.get(metric);
            (!counter.meets(required)).then(|| Violation {
                metric,
                actual: counter.percent(),
                required,
            })
        })
        .collect();

    for v in &violations {
        tracing::info!("threshold violation: {}", v);
    }

    RunVerdict {
        success: violations.is_empty(),
        per_metric_percent,
        violations,
        failed_units: Vec::new(),
        abandoned: 0,
    }
}

impl RunVerdict {
    /// Verdict for a run without coverage: only unit outcomes decide.
    pub fn without_coverage() -> Self {
        Self {
            success: true,
            per_metric_percent: BTreeMap::new(),
            violations: Vec::new(),
            failed_units: Vec::new(),
            abandoned: 0,
        }
    }

    /// Fold unit outcomes in. Any non-passing or abandoned unit fails the run.
    pub fn with_unit_outcomes(mut self, failed_units: Vec<UnitId>, abandoned: usize) -> Self {
        self.success = self.success && failed_units.is_empty() && abandoned == 0;
        self.failed_units = failed_units;
        self.abandoned = abandoned;
        self
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.success {
            ExitCode::Success
        } else {
            ExitCode::Failed
        }
    }
}

#[cfg(test)]
#[path = "gate_tests.rs"]
mod tests;
