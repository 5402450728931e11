// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Instrumentation hooks for in-process units.

use std::path::Path;

use super::{CoverageSample, FileCoverage, Metric, branch_arm_id};

/// Records declared and executed elements for one unit.
///
/// Every call is a no-op when coverage collection is disabled, so executors
/// can call the hooks unconditionally.
#[derive(Debug, Default)]
pub struct CoverageRecorder {
    enabled: bool,
    sample: CoverageSample,
}

impl CoverageRecorder {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            sample: CoverageSample::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Declare every element of a file's instrumented map.
    pub fn instrument(&mut self, file: &Path, map: &FileCoverage) {
        if self.enabled {
            self.sample.file_mut(file).union_with(&map.unexecuted());
        }
    }

    pub fn declare(&mut self, file: &Path, metric: Metric, id: u64) {
        if self.enabled {
            self.sample.file_mut(file).metric_mut(metric).declare(id);
        }
    }

    pub fn hit(&mut self, file: &Path, metric: Metric, id: u64) {
        if self.enabled {
            self.sample.file_mut(file).metric_mut(metric).record(id);
        }
    }

    pub fn hit_statement(&mut self, file: &Path, id: u64) {
        self.hit(file, Metric::Statements, id);
    }

    pub fn hit_function(&mut self, file: &Path, id: u64) {
        self.hit(file, Metric::Functions, id);
    }

    pub fn hit_line(&mut self, file: &Path, line: u64) {
        self.hit(file, Metric::Lines, line);
    }

    pub fn hit_branch(&mut self, file: &Path, branch: u32, arm: u32) {
        self.hit(file, Metric::Branches, branch_arm_id(branch, arm));
    }

    /// Merge a sample produced elsewhere (e.g. decoded from a unit process).
    pub fn absorb(&mut self, sample: &CoverageSample) {
        if self.enabled {
            for (path, coverage) in &sample.files {
                self.sample.file_mut(path).union_with(coverage);
            }
        }
    }

    pub fn into_sample(self) -> CoverageSample {
        self.sample
    }
}

#[cfg(test)]
#[path = "recorder_tests.rs"]
mod tests;
