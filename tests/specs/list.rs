// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral specs for `testgate list`.

use crate::prelude::*;

/// > list prints unit ids in discovery order without running them
#[test]
fn list_prints_units_in_order() {
    let project = Project::sh();
    project.file("tests/b.test.sh", "exit 1\n");
    project.file("tests/a.test.sh", "exit 1\n");
    project.file("src/lib.sh", "");

    project
        .cmd(&["list"])
        .assert()
        .success()
        .stdout("tests/a.test.sh\ntests/b.test.sh\n");
}

/// > Pruned directories and ignore patterns are never listed
#[test]
fn list_skips_pruned_and_ignored_paths() {
    let project = Project::sh_with("test_path_ignore_patterns = [\"/fixtures/\"]\n");
    project.file("a.test.sh", "");
    project.file("node_modules/dep/x.test.sh", "");
    project.file("fixtures/y.test.sh", "");

    project.cmd(&["list"]).assert().success().stdout("a.test.sh\n");
}

/// > list with JSON output includes ordinals
#[test]
fn list_json_output() {
    let project = Project::sh();
    project.file("a.test.sh", "");
    project.file("b.test.sh", "");

    let output = project.cmd(&["list", "-o", "json"]).output().unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["id"], "a.test.sh");
    assert_eq!(value[1]["ordinal"], 1);
}

/// > list fails when nothing matches
#[test]
fn list_with_no_tests_exits_one() {
    let project = Project::sh();

    project.cmd(&["list"]).assert().code(1);
    project
        .cmd(&["list", "--pass-with-no-tests"])
        .assert()
        .success()
        .stdout("");
}
