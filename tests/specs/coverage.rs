// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral specs for coverage aggregation and threshold gating.

use crate::prelude::*;

const LINES_80: &str = "[coverage_threshold.global]\nlines = 80\n";

/// > Two units covering 10 of 20 lines fall below an 80% line threshold
#[test]
fn coverage_below_threshold_exits_one() {
    let project = Project::sh_with(LINES_80);
    project.file("full.test.sh", &covering("src/full.js", 10, 10));
    project.file("empty.test.sh", &covering("src/empty.js", 0, 10));

    project
        .cmd(&["--coverage"])
        .assert()
        .code(1)
        .stdout(predicates::str::contains("2 passed"))
        .stdout(predicates::str::contains("(10/20)"))
        .stdout(predicates::str::contains("below 80% threshold"))
        .stderr(predicates::str::contains(
            "lines coverage 50% is below the 80% threshold",
        ));
}

/// > Coverage at or above every threshold passes
#[test]
fn coverage_meeting_threshold_exits_zero() {
    let project = Project::sh_with(LINES_80);
    project.file("a.test.sh", &covering("src/a.js", 8, 10));

    project.cmd(&["--coverage"]).assert().success();
}

/// > Hits for the same file are merged across units
#[test]
fn coverage_is_merged_across_units() {
    let project = Project::sh_with(LINES_80);
    project.file("first.test.sh", &covering("src/a.js", 5, 10));
    project.file("second.test.sh", &covering("src/a.js", 10, 10));

    project
        .cmd(&["--coverage"])
        .assert()
        .success()
        .stdout(predicates::str::contains("(10/10)"));
}

/// > --no-coverage skips the gate even with thresholds configured
#[test]
fn no_coverage_skips_gate() {
    let project = Project::sh_with(&format!("collect_coverage = true\n{LINES_80}"));
    project.file("a.test.sh", &covering("src/a.js", 0, 10));

    project.cmd(&["--no-coverage"]).assert().success();
    project.cmd(&[]).assert().code(1);
}

/// > A coverage-summary.json artifact is written to the coverage directory
#[test]
fn coverage_summary_is_written() {
    let project = Project::sh();
    project.file("a.test.sh", &covering("src/a.js", 3, 4));

    project.cmd(&["--coverage"]).assert().success();

    let summary: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(project.path().join("coverage/coverage-summary.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(summary["total"]["lines"]["covered"], 3);
    assert_eq!(summary["total"]["lines"]["total"], 4);
    assert_eq!(summary["total"]["lines"]["pct"], 75.0);
}

/// > Errored units contribute no coverage; failed units still do
#[test]
fn errored_unit_contributes_no_coverage() {
    let project = Project::sh();
    project.file("a.test.sh", &covering("src/a.js", 2, 4));
    project.file(
        "b.test.sh",
        &covering("src/b.js", 4, 4).replace(PASSING, FAILING),
    );
    project.file("c.test.sh", &format!("{}exit 7\n", covering("src/c.js", 4, 4).replace(PASSING, "")));

    let output = project.cmd(&["--coverage", "-o", "json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["summary"]["failed"], 1);
    assert_eq!(value["summary"]["errored"], 1);
    assert_eq!(value["coverage"]["lines"]["covered"], 6);
    assert_eq!(value["coverage"]["lines"]["total"], 8);
}
