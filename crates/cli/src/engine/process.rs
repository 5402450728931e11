// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Out-of-process unit execution.
//!
//! Each unit runs the configured command in its own process. The process
//! learns where to report through environment variables:
//!
//! | Variable | Content |
//! |----------|---------|
//! | `TESTGATE_UNIT_ID` | unit id |
//! | `TESTGATE_ROOT_DIR` | project root |
//! | `TESTGATE_MODULE_MAP` | JSON file holding the resolved module registry |
//! | `TESTGATE_RESULT_FILE` | where the unit writes its assertion results |
//! | `TESTGATE_COVERAGE_FILE` | where the unit writes Istanbul coverage (coverage runs only) |
//!
//! The result file looks like
//! `{"assertions": [{"title": "adds", "status": "failed", "expected": 3, "actual": 4}]}`.
//! Any failed assertion fails the unit. Otherwise exit status 0 passes it and
//! anything else is a crash.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;

use serde::Deserialize;

use super::executor::{Completion, UnitContext, UnitExecutor};
use super::result::FailureDetail;
use crate::config::Config;
use crate::coverage::istanbul::parse_istanbul_json;
use crate::discovery::TestUnit;

pub const ENV_UNIT_ID: &str = "TESTGATE_UNIT_ID";
pub const ENV_ROOT_DIR: &str = "TESTGATE_ROOT_DIR";
pub const ENV_MODULE_MAP: &str = "TESTGATE_MODULE_MAP";
pub const ENV_RESULT_FILE: &str = "TESTGATE_RESULT_FILE";
pub const ENV_COVERAGE_FILE: &str = "TESTGATE_COVERAGE_FILE";

/// Interval between exit checks while a unit process runs.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Bytes of stderr kept for crash reports.
const STDERR_TAIL_BYTES: usize = 2048;

/// Runs units as child processes.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    command: Vec<String>,
    env: BTreeMap<String, String>,
    root_dir: PathBuf,
}

impl ProcessExecutor {
    pub fn new(command: Vec<String>, env: BTreeMap<String, String>, root_dir: PathBuf) -> Self {
        Self {
            command,
            env,
            root_dir,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.runner.command.clone(),
            config.runner.env.clone(),
            config.root_dir.clone(),
        )
    }

    /// Command line for `unit`, placeholders substituted.
    pub fn argv(&self, unit: &TestUnit) -> Vec<String> {
        let unit_path = unit.path.to_string_lossy();
        let root = self.root_dir.to_string_lossy();
        self.command
            .iter()
            .map(|arg| arg.replace("{unit}", &unit_path).replace("{root}", &root))
            .collect()
    }

    fn spawn(&self, unit: &TestUnit, ctx: &UnitContext, files: &ProtocolFiles) -> std::io::Result<Child> {
        let argv = self.argv(unit);
        let Some((program, args)) = argv.split_first() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "empty runner command",
            ));
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(&self.root_dir)
            .envs(&self.env)
            .env(ENV_UNIT_ID, unit.id.as_str())
            .env(ENV_ROOT_DIR, &self.root_dir)
            .env(ENV_MODULE_MAP, &files.module_map)
            .env(ENV_RESULT_FILE, &files.result)
            .stdin(Stdio::null())
            .stdout(Stdio::from(File::create(&files.stdout)?))
            .stderr(Stdio::from(File::create(&files.stderr)?));
        if ctx.coverage.is_enabled() {
            command.env(ENV_COVERAGE_FILE, &files.coverage);
        }
        command.spawn()
    }
}

impl UnitExecutor for ProcessExecutor {
    fn execute(&self, unit: &TestUnit, ctx: &mut UnitContext) -> Completion {
        let files = ProtocolFiles::new(ctx.scratch.path());

        if let Err(e) = write_module_map(&files.module_map, ctx) {
            return crash(format!("cannot write module map: {e}"));
        }

        let mut child = match self.spawn(unit, ctx, &files) {
            Ok(child) => child,
            Err(e) => {
                let program = self.command.first().map(String::as_str).unwrap_or("");
                return crash(format!("cannot start '{program}': {e}"));
            }
        };
        tracing::debug!("unit {} started as pid {}", unit.id, child.id());

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    stop(&mut child);
                    return crash(format!("cannot wait for unit process: {e}"));
                }
            }
            if ctx.should_stop() {
                stop(&mut child);
                return Completion::Cancelled;
            }
            if ctx.is_past_deadline() {
                stop(&mut child);
                tracing::debug!("unit {} killed at deadline", unit.id);
                return Completion::Errored(FailureDetail::Timeout {
                    limit_ms: ctx.timeout.as_millis() as u64,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        if ctx.coverage.is_enabled() {
            absorb_coverage(&files.coverage, &self.root_dir, ctx);
        }

        classify(status, &files)
    }
}

/// Scratch file locations for one unit.
struct ProtocolFiles {
    module_map: PathBuf,
    result: PathBuf,
    coverage: PathBuf,
    stdout: PathBuf,
    stderr: PathBuf,
}

impl ProtocolFiles {
    fn new(scratch: &Path) -> Self {
        Self {
            module_map: scratch.join("module-map.json"),
            result: scratch.join("result.json"),
            coverage: scratch.join("coverage-final.json"),
            stdout: scratch.join("stdout.log"),
            stderr: scratch.join("stderr.log"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UnitReport {
    #[serde(default)]
    assertions: Vec<AssertionRecord>,
}

#[derive(Debug, Deserialize)]
struct AssertionRecord {
    title: String,
    status: AssertionStatus,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    expected: Option<serde_json::Value>,
    #[serde(default)]
    actual: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum AssertionStatus {
    Passed,
    Failed,
}

fn write_module_map(path: &Path, ctx: &UnitContext) -> std::io::Result<()> {
    let json = serde_json::to_vec(&ctx.registry).map_err(std::io::Error::other)?;
    fs::write(path, json)
}

fn absorb_coverage(path: &Path, root_dir: &Path, ctx: &mut UnitContext) {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return,
        Err(e) => {
            tracing::warn!("cannot read {}: {}", path.display(), e);
            return;
        }
    };
    match parse_istanbul_json(&content, root_dir) {
        Ok(sample) => ctx.coverage.absorb(&sample),
        Err(e) => tracing::warn!("malformed coverage data from unit: {}", e),
    }
}

fn classify(status: ExitStatus, files: &ProtocolFiles) -> Completion {
    let report = match fs::read_to_string(&files.result) {
        Ok(content) => match serde_json::from_str::<UnitReport>(&content) {
            Ok(report) => Some(report),
            Err(e) => return crash(format!("malformed result file: {e}")),
        },
        Err(_) => None,
    };

    if let Some(failed) = report
        .iter()
        .flat_map(|r| &r.assertions)
        .find(|a| a.status == AssertionStatus::Failed)
    {
        return Completion::Failed(FailureDetail::Assertion {
            title: failed.title.clone(),
            message: failed
                .message
                .clone()
                .unwrap_or_else(|| "assertion failed".to_string()),
            expected: failed.expected.as_ref().map(render_value),
            actual: failed.actual.as_ref().map(render_value),
        });
    }

    if status.success() {
        return Completion::Passed;
    }

    let exit = match status.code() {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    };
    let tail = stderr_tail(&files.stderr);
    if tail.is_empty() {
        crash(format!("unit process failed with {exit}"))
    } else {
        crash(format!("unit process failed with {exit}: {tail}"))
    }
}

/// Strings render without quotes; everything else as JSON.
fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn stderr_tail(path: &Path) -> String {
    let Ok(bytes) = fs::read(path) else {
        return String::new();
    };
    let start = bytes.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&bytes[start..]).trim().to_string()
}

fn stop(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!("kill failed: {}", e);
    }
    let _ = child.wait();
}

fn crash(message: String) -> Completion {
    Completion::Errored(FailureDetail::Crash { message })
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
