// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Istanbul `coverage-final.json` decoding.
//!
//! Unit processes report coverage in the Istanbul file-coverage format:
//! a map of file path to `statementMap`/`s`, `fnMap`/`f` and
//! `branchMap`/`b`. Lines are derived the way Istanbul does it: a line
//! exists if a statement starts on it and is covered if any statement
//! starting on it executed.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::{CoverageSample, FileCoverage, branch_arm_id};
use crate::config::normalize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileEntry {
    path: Option<String>,
    #[serde(default)]
    statement_map: BTreeMap<String, Span>,
    #[serde(default)]
    fn_map: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    branch_map: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    s: BTreeMap<String, u64>,
    #[serde(default)]
    f: BTreeMap<String, u64>,
    #[serde(default)]
    b: BTreeMap<String, Vec<u64>>,
}

#[derive(Debug, Deserialize)]
struct Span {
    start: Position,
}

#[derive(Debug, Deserialize)]
struct Position {
    line: u64,
}

/// Decode Istanbul JSON. Relative file paths are anchored at `base_dir`.
pub fn parse_istanbul_json(content: &str, base_dir: &Path) -> serde_json::Result<CoverageSample> {
    let entries: BTreeMap<String, FileEntry> = serde_json::from_str(content)?;
    let mut sample = CoverageSample::default();

    for (key, entry) in entries {
        let raw = entry.path.as_deref().unwrap_or(&key);
        let path = normalize(&base_dir.join(raw));
        let file = sample.file_mut(&path);
        file.union_with(&decode_file(&entry));
    }

    Ok(sample)
}

fn decode_file(entry: &FileEntry) -> FileCoverage {
    let mut file = FileCoverage::default();

    for key in entry.statement_map.keys().chain(entry.s.keys()) {
        if let Some(id) = parse_id(key) {
            file.statements.declare(id);
        }
    }
    for (key, count) in &entry.s {
        if *count > 0
            && let Some(id) = parse_id(key)
        {
            file.statements.record(id);
        }
    }

    for key in entry.fn_map.keys().chain(entry.f.keys()) {
        if let Some(id) = parse_id(key) {
            file.functions.declare(id);
        }
    }
    for (key, count) in &entry.f {
        if *count > 0
            && let Some(id) = parse_id(key)
        {
            file.functions.record(id);
        }
    }

    for (key, arms) in &entry.b {
        let Some(branch) = key.parse::<u32>().ok() else {
            tracing::warn!("skipping branch with non-numeric id '{}'", key);
            continue;
        };
        for (arm, count) in arms.iter().enumerate() {
            let id = branch_arm_id(branch, arm as u32);
            if *count > 0 {
                file.branches.record(id);
            } else {
                file.branches.declare(id);
            }
        }
    }
    if entry.b.is_empty() && !entry.branch_map.is_empty() {
        tracing::debug!("branchMap without counts; branches not declared");
    }

    for (key, span) in &entry.statement_map {
        let line = span.start.line;
        let executed = entry.s.get(key).copied().unwrap_or(0) > 0;
        if executed {
            file.lines.record(line);
        } else {
            file.lines.declare(line);
        }
    }

    file
}

fn parse_id(key: &str) -> Option<u64> {
    let id = key.parse::<u64>().ok();
    if id.is_none() {
        tracing::warn!("skipping coverage element with non-numeric id '{}'", key);
    }
    id
}

#[cfg(test)]
#[path = "istanbul_tests.rs"]
mod tests;
