// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral specs for `testgate run`.

use crate::prelude::*;

// =============================================================================
// Exit Codes
// =============================================================================

/// > All units pass and no threshold is configured: exit 0
#[test]
fn passing_suite_exits_zero() {
    let project = Project::sh();
    project.file("tests/a.test.sh", PASSING);
    project.file("tests/b.test.sh", PASSING);

    project
        .cmd(&[])
        .assert()
        .success()
        .stdout(predicates::str::contains("PASS  tests/a.test.sh"))
        .stdout(predicates::str::contains("2 passed"))
        .stdout(predicates::str::contains("2 total"));
}

/// > `run` is the default command
#[test]
fn run_subcommand_matches_default() {
    let project = Project::sh();
    project.file("a.test.sh", PASSING);

    project
        .cmd(&["run"])
        .assert()
        .success()
        .stdout(predicates::str::contains("1 passed"));
}

/// > A failed assertion fails the run (exit 1) and names the unit
#[test]
fn failing_unit_exits_one() {
    let project = Project::sh();
    project.file("a.test.sh", PASSING);
    project.file("b.test.sh", FAILING);

    project
        .cmd(&[])
        .assert()
        .code(1)
        .stdout(predicates::str::contains("FAIL  b.test.sh"))
        .stdout(predicates::str::contains("adds: values differ (expected 3, received 4)"))
        .stderr(predicates::str::contains("1 unit(s) did not pass"))
        .stderr(predicates::str::contains("b.test.sh"));
}

/// > A unit exiting nonzero without a failed assertion is errored
#[test]
fn crashing_unit_is_errored() {
    let project = Project::sh();
    project.file("crash.test.sh", "echo boom >&2\nexit 3\n");

    project
        .cmd(&[])
        .assert()
        .code(1)
        .stdout(predicates::str::contains("ERROR crash.test.sh"))
        .stdout(predicates::str::contains("boom"));
}

// =============================================================================
// Isolation
// =============================================================================

/// > A hung unit times out without stalling its siblings
#[test]
fn hung_unit_times_out() {
    let project = Project::sh();
    project.file("hang.test.sh", HANGING);
    project.file("ok.test.sh", PASSING);

    assert_cmd::Command::from_std(project.cmd(&["--timeout", "300"]))
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .code(1)
        .stdout(predicates::str::contains("ERROR hang.test.sh"))
        .stdout(predicates::str::contains("exceeded timeout of 300 ms"))
        .stdout(predicates::str::contains("PASS  ok.test.sh"));
}

/// > Units run in a fresh scratch context and cannot see each other's files
#[test]
fn units_do_not_share_scratch_files() {
    let project = Project::sh_with("max_workers = 1\n");
    project.file(
        "a.test.sh",
        &format!("touch \"$(dirname \"$TESTGATE_RESULT_FILE\")/marker\"\n{PASSING}"),
    );
    project.file(
        "b.test.sh",
        &format!(
            "if [ -e \"$(dirname \"$TESTGATE_RESULT_FILE\")/marker\" ]; then exit 1; fi\n{PASSING}"
        ),
    );

    project
        .cmd(&[])
        .assert()
        .success()
        .stdout(predicates::str::contains("2 passed"));
}

/// > --bail stops scheduling after the first non-passing unit
#[test]
fn bail_abandons_remaining_units() {
    let project = Project::sh_with("max_workers = 1\n");
    project.file("a.test.sh", FAILING);
    project.file("b.test.sh", PASSING);
    project.file("c.test.sh", PASSING);

    project
        .cmd(&["--bail", "1"])
        .assert()
        .code(1)
        .stdout(predicates::str::contains("FAIL  a.test.sh"))
        .stdout(predicates::str::contains("abandoned"));
}

// =============================================================================
// Discovery
// =============================================================================

/// > No tests found is a failure unless explicitly allowed
#[test]
fn no_tests_found_exits_one() {
    let project = Project::sh();
    project.file("src/lib.sh", "");

    project
        .cmd(&[])
        .assert()
        .code(1)
        .stderr(predicates::str::contains("no tests found"));
}

/// > --pass-with-no-tests turns an empty run into success
#[test]
fn pass_with_no_tests_succeeds() {
    let project = Project::sh();

    project
        .cmd(&["--pass-with-no-tests"])
        .assert()
        .success()
        .stdout(predicates::str::contains("0 total"));
}

// =============================================================================
// Output
// =============================================================================

/// > JSON output carries the summary and per-unit results
#[test]
fn json_output_is_machine_readable() {
    let project = Project::sh();
    project.file("a.test.sh", PASSING);
    project.file("b.test.sh", FAILING);

    let output = project.cmd(&["-o", "json"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["summary"]["total"], 2);
    assert_eq!(value["summary"]["passed"], 1);
    assert_eq!(value["summary"]["failed"], 1);
    assert_eq!(value["results"][0]["unit_id"], "a.test.sh");
    assert_eq!(value["results"][1]["outcome"], "failed");
    assert_eq!(value["results"][1]["failure"]["kind"], "assertion");
    assert_eq!(value["failed_units"][0], "b.test.sh");
}

/// > Results are reported in discovery order
#[test]
fn results_follow_discovery_order() {
    let project = Project::sh();
    project.file("b.test.sh", PASSING);
    project.file("a.test.sh", PASSING);
    project.file("c/a.test.sh", PASSING);

    let output = project.cmd(&["-o", "json"]).output().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let ids: Vec<&str> = value["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["unit_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["a.test.sh", "b.test.sh", "c/a.test.sh"]);
}
