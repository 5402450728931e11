// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral specs for configuration loading and validation.

use crate::prelude::*;

/// > `config` validates the config file and reports OK
#[test]
fn valid_config_reports_ok() {
    let project = Project::sh();

    project
        .cmd(&["config"])
        .assert()
        .success()
        .stdout(predicates::str::contains("testgate.toml: OK"));
}

/// > A threshold outside [0, 100] is a config error (exit 2) before any unit runs
#[test]
fn out_of_range_threshold_exits_two() {
    let project = Project::sh_with("[coverage_threshold.global]\nlines = 120\n");
    project.file("a.test.sh", "touch ran\n");

    project
        .cmd(&["--coverage"])
        .assert()
        .code(2)
        .stderr(predicates::str::contains("config error"));
    assert!(!project.path().join("ran").exists());
}

/// > A malformed config file is a config error
#[test]
fn malformed_config_exits_two() {
    let project = Project::empty();
    project.file("testgate.toml", "version = [\n");

    project.cmd(&[]).assert().code(2);
}

/// > An invalid test_match glob is a config error
#[test]
fn invalid_glob_exits_two() {
    let project = Project::empty();
    project.file("testgate.toml", "version = 1\ntest_match = [\"**/[.test.sh\"]\n");

    project.cmd(&["config"]).assert().code(2);
}

/// > A missing root directory is a config error
#[test]
fn missing_root_exits_two() {
    let project = Project::sh_with("roots = [\"<rootDir>/nope\"]\n");

    project
        .cmd(&["list"])
        .assert()
        .code(2)
        .stderr(predicates::str::contains("root directory not found"));
}

/// > -C selects an explicit config file
#[test]
fn explicit_config_path() {
    let project = Project::empty();
    project.file(
        "ci/gate.toml",
        "version = 1\nroot_dir = \"..\"\ntest_match = [\"**/*.test.sh\"]\n\n[runner]\ncommand = [\"sh\", \"{unit}\"]\n",
    );
    project.file("a.test.sh", PASSING);

    project
        .cmd(&["-C", "ci/gate.toml", "list"])
        .assert()
        .success()
        .stdout("a.test.sh\n");
}

/// > -C naming a missing file is a config error
#[test]
fn explicit_missing_config_exits_two() {
    let project = Project::empty();

    project.cmd(&["-C", "missing.toml"]).assert().code(2);
}

/// > Unknown keys warn but do not fail
#[test]
fn unknown_key_warns() {
    let project = Project::sh_with("mystery = 1\n");

    project
        .cmd(&["config"])
        .assert()
        .success()
        .stderr(predicates::str::contains("unknown config key 'mystery'"));
}
