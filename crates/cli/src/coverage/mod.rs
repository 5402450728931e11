// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Coverage data model and aggregation.
//!
//! Units produce a [`CoverageSample`]: per file, the set of known element
//! ids and the subset that executed, for each [`Metric`]. Aggregation is a
//! set union per file, so merging is idempotent and order-independent, and
//! counters never decrease. Totals are computed from the merged sets after
//! all units have finished.

pub mod instrument;
pub mod istanbul;
mod recorder;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use recorder::CoverageRecorder;

/// A coverage metric. Declaration order is reporting order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Statements,
    Branches,
    Functions,
    Lines,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Statements,
        Metric::Branches,
        Metric::Functions,
        Metric::Lines,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Statements => "statements",
            Metric::Branches => "branches",
            Metric::Functions => "functions",
            Metric::Lines => "lines",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Id of one arm of a branch point.
pub fn branch_arm_id(branch: u32, arm: u32) -> u64 {
    (u64::from(branch) << 32) | u64::from(arm)
}

/// Known and executed element ids for one metric of one file.
///
/// Invariant: `hit` is a subset of `total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitSet {
    pub hit: BTreeSet<u64>,
    pub total: BTreeSet<u64>,
}

impl HitSet {
    /// Register an element without marking it executed.
    pub fn declare(&mut self, id: u64) {
        self.total.insert(id);
    }

    /// Mark an element executed (declaring it if needed).
    pub fn record(&mut self, id: u64) {
        self.total.insert(id);
        self.hit.insert(id);
    }

    pub fn union_with(&mut self, other: &HitSet) {
        self.total.extend(other.total.iter().copied());
        self.hit.extend(other.hit.iter().copied());
    }

    pub fn counter(&self) -> Counter {
        Counter {
            covered: self.hit.len() as u64,
            total: self.total.len() as u64,
        }
    }
}

/// Coverage of one file, all metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCoverage {
    pub statements: HitSet,
    pub branches: HitSet,
    pub functions: HitSet,
    pub lines: HitSet,
}

impl FileCoverage {
    pub fn metric(&self, metric: Metric) -> &HitSet {
        match metric {
            Metric::Statements => &self.statements,
            Metric::Branches => &self.branches,
            Metric::Functions => &self.functions,
            Metric::Lines => &self.lines,
        }
    }

    pub fn metric_mut(&mut self, metric: Metric) -> &mut HitSet {
        match metric {
            Metric::Statements => &mut self.statements,
            Metric::Branches => &mut self.branches,
            Metric::Functions => &mut self.functions,
            Metric::Lines => &mut self.lines,
        }
    }

    pub fn union_with(&mut self, other: &FileCoverage) {
        for metric in Metric::ALL {
            self.metric_mut(metric).union_with(other.metric(metric));
        }
    }

    /// Same elements, none executed.
    pub fn unexecuted(&self) -> FileCoverage {
        let mut out = FileCoverage::default();
        for metric in Metric::ALL {
            out.metric_mut(metric).total = self.metric(metric).total.clone();
        }
        out
    }

    pub fn totals(&self) -> CoverageTotals {
        let mut totals = CoverageTotals::default();
        for metric in Metric::ALL {
            totals.add(metric, self.metric(metric).counter());
        }
        totals
    }
}

/// Coverage recorded by one unit, keyed by absolute file path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSample {
    pub files: BTreeMap<PathBuf, FileCoverage>,
}

impl CoverageSample {
    pub fn file_mut(&mut self, path: &Path) -> &mut FileCoverage {
        self.files.entry(path.to_path_buf()).or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Covered/total counts for one metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub covered: u64,
    pub total: u64,
}

impl Counter {
    pub fn new(covered: u64, total: u64) -> Self {
        Self { covered, total }
    }

    /// Percentage truncated toward zero at two decimals.
    ///
    /// A metric with nothing to cover is fully covered.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        let hundredths = u128::from(self.covered) * 10_000 / u128::from(self.total);
        hundredths as f64 / 100.0
    }

    /// Exact `covered / total * 100 >= minimum`, before any truncation.
    pub fn meets(&self, minimum: f64) -> bool {
        if self.total == 0 {
            return true;
        }
        self.covered as f64 * 100.0 >= minimum * self.total as f64
    }
}

impl std::ops::AddAssign for Counter {
    fn add_assign(&mut self, rhs: Counter) {
        self.covered += rhs.covered;
        self.total += rhs.total;
    }
}

/// Whole-run counters per metric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoverageTotals {
    metrics: BTreeMap<Metric, Counter>,
}

impl CoverageTotals {
    pub fn get(&self, metric: Metric) -> Counter {
        self.metrics.get(&metric).copied().unwrap_or_default()
    }

    pub fn add(&mut self, metric: Metric, counter: Counter) {
        *self.metrics.entry(metric).or_default() += counter;
    }

    /// All four metrics in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = (Metric, Counter)> + '_ {
        Metric::ALL.into_iter().map(|m| (m, self.get(m)))
    }
}

/// Merged per-file coverage for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageMap {
    files: BTreeMap<PathBuf, FileCoverage>,
}

impl CoverageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `sample` into the map.
    pub fn merge(&mut self, sample: &CoverageSample) {
        for (path, coverage) in &sample.files {
            self.files
                .entry(path.clone())
                .or_default()
                .union_with(coverage);
        }
    }

    /// Add files no unit touched, with all elements unexecuted.
    ///
    /// Files already present are left alone.
    pub fn include_untested(&mut self, inventory: impl IntoIterator<Item = (PathBuf, FileCoverage)>) {
        for (path, coverage) in inventory {
            self.files
                .entry(path)
                .or_insert_with(|| coverage.unexecuted());
        }
    }

    /// Drop files for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&Path) -> bool) {
        self.files.retain(|path, _| keep(path));
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    pub fn files(&self) -> impl Iterator<Item = (&PathBuf, &FileCoverage)> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum per-file counters across the run.
    pub fn totals(&self) -> CoverageTotals {
        let mut totals = CoverageTotals::default();
        for metric in Metric::ALL {
            totals.add(metric, Counter::default());
        }
        for coverage in self.files.values() {
            for metric in Metric::ALL {
                totals.add(metric, coverage.metric(metric).counter());
            }
        }
        totals
    }
}

/// Merge samples and compute whole-run totals.
pub fn merge<'a>(samples: impl IntoIterator<Item = &'a CoverageSample>) -> CoverageTotals {
    let mut map = CoverageMap::new();
    for sample in samples {
        map.merge(sample);
    }
    map.totals()
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
