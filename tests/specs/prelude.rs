// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers for behavioral specifications.
//!
//! Provides a small DSL for building throwaway projects and running the
//! testgate binary inside them.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(dead_code)]

pub use assert_cmd::prelude::*;
pub use predicates;
pub use predicates::prelude::PredicateBooleanExt;
use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Returns a Command configured to run the testgate binary
pub fn testgate_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("testgate"));
    cmd.env_remove("TESTGATE_CONFIG");
    cmd.env_remove("TESTGATE_LOG");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Config keys that match `*.test.sh` units.
const SH_MATCH: &str = "version = 1\ntest_match = [\"**/*.test.sh\"]\n";

/// Runner table that executes units through `sh`.
const SH_RUNNER: &str = "[runner]\ncommand = [\"sh\", \"{unit}\"]\n";

/// A unit that passes one assertion.
pub const PASSING: &str = r#"printf '{"assertions":[{"title":"works","status":"passed"}]}' > "$TESTGATE_RESULT_FILE"
"#;

/// A unit whose assertion fails with expected/actual values.
pub const FAILING: &str = r#"printf '{"assertions":[{"title":"adds","status":"failed","message":"values differ","expected":"3","actual":"4"}]}' > "$TESTGATE_RESULT_FILE"
"#;

/// A unit that never finishes.
pub const HANGING: &str = "sleep 30\n";

/// Unit script reporting `covered` of `total` single-statement lines of `file`.
pub fn covering(file: &str, covered: u32, total: u32) -> String {
    let mut statements = Vec::new();
    let mut hits = Vec::new();
    for i in 0..total {
        let line = i + 1;
        statements.push(format!(
            r#""{i}":{{"start":{{"line":{line},"column":0}},"end":{{"line":{line},"column":10}}}}"#
        ));
        hits.push(format!(r#""{i}":{}"#, u32::from(i < covered)));
    }
    format!(
        "cat > \"$TESTGATE_COVERAGE_FILE\" <<'JSON'\n{{\"{file}\":{{\"path\":\"{file}\",\"statementMap\":{{{}}},\"fnMap\":{{}},\"branchMap\":{{}},\"s\":{{{}}},\"f\":{{}},\"b\":{{}}}}}}\nJSON\n{PASSING}",
        statements.join(","),
        hits.join(",")
    )
}

/// A temporary project directory.
pub struct Project {
    dir: TempDir,
}

impl Project {
    /// Project with no files.
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Project with a `testgate.toml` running shell units.
    pub fn sh() -> Self {
        Self::sh_with("")
    }

    /// Shell-unit project with extra config. `extra` goes before the
    /// runner table, so it may hold top-level keys followed by tables.
    pub fn sh_with(extra: &str) -> Self {
        let project = Self::empty();
        project.file("testgate.toml", &format!("{SH_MATCH}{extra}\n{SH_RUNNER}"));
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file, creating parent directories.
    pub fn file(&self, rel: &str, content: &str) {
        let path = self.dir.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// Run testgate in the project with `args`.
    pub fn cmd(&self, args: &[&str]) -> Command {
        let mut cmd = testgate_cmd();
        cmd.args(args).current_dir(self.path());
        cmd
    }
}
