// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared unit test utilities.
//!
//! Provides common helpers for unit tests in the testgate crate.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use tempfile::{NamedTempFile, TempDir};

use crate::discovery::{TestUnit, UnitId};

/// Creates a temp directory with custom config content.
pub fn temp_project_with_config(config: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("testgate.toml"), config).unwrap();
    dir
}

/// Creates a directory tree from a list of (path, content) pairs.
///
/// Parent directories are created automatically.
///
/// # Example
///
/// ```ignore
/// let tmp = TempDir::new().unwrap();
/// create_tree(tmp.path(), &[
///     ("src/math.ts", "export const add = (a, b) => a + b;"),
///     ("tests/math.test.ts", "import { add } from '../src/math';"),
/// ]);
/// ```
pub fn create_tree(root: &Path, files: &[(&str, &str)]) {
    for (path, content) in files {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }
}

/// Builds a unit for `path` relative to `root`.
pub fn unit(root: &Path, path: &str, ordinal: usize) -> TestUnit {
    TestUnit {
        id: UnitId::new(path),
        path: root.join(path),
        discovered_at: Utc::now(),
        ordinal,
    }
}

/// Short timeout for tests that exercise the timeout path.
pub fn short_timeout() -> Duration {
    Duration::from_millis(300)
}

/// Creates a temp file with the given content for testing.
///
/// Returns the NamedTempFile which keeps the file alive.
pub fn temp_file_with_content(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file.flush().unwrap();
    file
}

/// Creates a temp file with content using writeln! for each line.
pub fn temp_file_with_lines(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file.flush().unwrap();
    file
}

/// A finished run: one passing, one failing and one abandoned unit, with
/// lines at 10/20 against an 80% minimum.
pub fn sample_report() -> crate::runner::RunReport {
    use crate::config::ThresholdConfig;
    use crate::coverage::{CoverageMap, CoverageSample, Metric};
    use crate::engine::{ExecutionResult, FailureDetail, RunResults};
    use crate::gate;

    let root = Path::new("/project");
    let mut sample = CoverageSample::default();
    let file = sample.file_mut(&root.join("src/math.js"));
    for line in 1..=20 {
        if line <= 10 {
            file.lines.record(line);
        } else {
            file.lines.declare(line);
        }
    }
    let mut map = CoverageMap::new();
    map.merge(&sample);
    let totals = map.totals();

    let results = RunResults {
        results: vec![
            ExecutionResult::passed(UnitId::new("src/math.test.js"), Duration::from_millis(12), sample),
            ExecutionResult::failed(
                UnitId::new("src/parse.test.js"),
                Duration::from_millis(1500),
                FailureDetail::Assertion {
                    title: "parses numbers".to_string(),
                    message: "values differ".to_string(),
                    expected: Some("1".to_string()),
                    actual: Some("2".to_string()),
                },
                CoverageSample::default(),
            ),
        ],
        abandoned: vec![UnitId::new("src/slow.test.js")],
    };
    let thresholds = ThresholdConfig::new([(Metric::Lines, 80.0)]).unwrap();
    let verdict = gate::evaluate(&totals, &thresholds)
        .with_unit_outcomes(results.non_passing(), results.abandoned.len());

    crate::runner::RunReport {
        units: vec![
            unit(root, "src/math.test.js", 0),
            unit(root, "src/parse.test.js", 1),
            unit(root, "src/slow.test.js", 2),
        ],
        results,
        coverage: Some(map),
        totals: Some(totals),
        verdict,
        elapsed: Duration::from_millis(2346),
    }
}
