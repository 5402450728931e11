// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Coverage threshold configuration.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::coverage::Metric;
use crate::error::{Error, Result};

/// `[coverage_threshold]` table. Only the whole-run `global` scope exists.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoverageThresholdConfig {
    pub global: ThresholdConfig,
}

/// Minimum percentage per metric. Metrics that are absent are not checked.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(from = "RawThresholds")]
pub struct ThresholdConfig {
    minimums: BTreeMap<Metric, f64>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawThresholds {
    statements: Option<f64>,
    branches: Option<f64>,
    functions: Option<f64>,
    lines: Option<f64>,
}

impl From<RawThresholds> for ThresholdConfig {
    fn from(raw: RawThresholds) -> Self {
        let mut config = ThresholdConfig::default();
        let pairs = [
            (Metric::Statements, raw.statements),
            (Metric::Branches, raw.branches),
            (Metric::Functions, raw.functions),
            (Metric::Lines, raw.lines),
        ];
        for (metric, value) in pairs {
            if let Some(min) = value {
                config.minimums.insert(metric, min);
            }
        }
        config
    }
}

impl ThresholdConfig {
    /// Build a config from pairs, validating each minimum.
    pub fn new(pairs: impl IntoIterator<Item = (Metric, f64)>) -> Result<Self> {
        let config = ThresholdConfig {
            minimums: pairs.into_iter().collect(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Minimum for `metric`, if configured.
    pub fn minimum(&self, metric: Metric) -> Option<f64> {
        self.minimums.get(&metric).copied()
    }

    /// Configured minimums in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.minimums.iter().map(|(m, v)| (*m, *v))
    }

    pub fn is_empty(&self) -> bool {
        self.minimums.is_empty()
    }

    /// Reject minimums outside [0, 100].
    pub fn validate(&self) -> Result<()> {
        for (metric, min) in self.iter() {
            if !min.is_finite() || !(0.0..=100.0).contains(&min) {
                return Err(Error::config(format!(
                    "coverage_threshold.global.{metric} must be between 0 and 100, got {min}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "threshold_tests.rs"]
mod tests;
