// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Static instrumentation for files no unit executed.
//!
//! Files selected by `collect_coverage_from` must count against the totals
//! even when nothing loads them. Without a runtime instrumenter available,
//! their element inventory is estimated from source text:
//! - lines and statements: one per line holding code (not blank, not comment)
//! - functions: `function` keywords and arrow functions
//! - branches: two arms per `if`, ternary, `&&`, `||`, `??`; one per `case`/`default:`

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use globset::GlobSet;
use regex::Regex;

use super::{FileCoverage, branch_arm_id};
use crate::discovery::walk_sorted;
use crate::file_reader;

/// Function declarations and expressions.
#[allow(clippy::expect_used)]
static FUNCTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bfunction\b|=>").expect("valid regex pattern")
});

/// Two-armed branch points.
#[allow(clippy::expect_used)]
static BINARY_BRANCH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bif\s*\(|&&|\|\||\?\?|\s\?\s").expect("valid regex pattern")
});

/// Single-armed branch points (switch cases).
#[allow(clippy::expect_used)]
static CASE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bcase\b[^:]*:|\bdefault\s*:").expect("valid regex pattern")
});

/// Estimate the instrumented element inventory of `source`.
pub fn scan(source: &str) -> FileCoverage {
    let mut file = FileCoverage::default();
    let mut in_block_comment = false;
    let mut statement: u64 = 0;
    let mut function: u64 = 0;
    let mut branch: u32 = 0;

    for (idx, raw) in source.lines().enumerate() {
        let code = strip_comments(raw, &mut in_block_comment);
        let code = code.trim();
        if code.is_empty() || is_punctuation_only(code) {
            continue;
        }

        let line = idx as u64 + 1;
        file.lines.declare(line);
        file.statements.declare(statement);
        statement += 1;

        for _ in FUNCTION_PATTERN.find_iter(code) {
            file.functions.declare(function);
            function += 1;
        }
        for _ in BINARY_BRANCH_PATTERN.find_iter(code) {
            file.branches.declare(branch_arm_id(branch, 0));
            file.branches.declare(branch_arm_id(branch, 1));
            branch += 1;
        }
        for _ in CASE_PATTERN.find_iter(code) {
            file.branches.declare(branch_arm_id(branch, 0));
            branch += 1;
        }
    }

    file
}

/// Read and scan a file.
pub fn scan_file(path: &Path) -> std::io::Result<FileCoverage> {
    file_reader::with_text(path, scan)
}

/// Files under `root_dir` matching `include`, in path order.
pub fn collect_sources(root_dir: &Path, include: &GlobSet, prune_dirs: &[String]) -> Vec<PathBuf> {
    if include.is_empty() {
        return Vec::new();
    }

    walk_sorted(root_dir, prune_dirs)
        .into_iter()
        .filter(|path| include.is_match(path.strip_prefix(root_dir).unwrap_or(path)))
        .collect()
}

/// Inventory for every file in `paths`; unreadable files are skipped.
pub fn inventory(paths: &[PathBuf]) -> Vec<(PathBuf, FileCoverage)> {
    paths
        .iter()
        .filter_map(|path| match scan_file(path) {
            Ok(coverage) => Some((path.clone(), coverage)),
            Err(e) => {
                tracing::warn!("cannot instrument {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

/// Remove `//` and `/* */` comments from one line, tracking block state.
fn strip_comments(line: &str, in_block: &mut bool) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    loop {
        if *in_block {
            match rest.find("*/") {
                Some(end) => {
                    *in_block = false;
                    rest = &rest[end + 2..];
                }
                None => return out,
            }
        }
        let block = rest.find("/*");
        let inline = rest.find("//");
        match (block, inline) {
            (Some(b), Some(l)) if l < b => {
                out.push_str(&rest[..l]);
                return out;
            }
            (Some(b), _) => {
                out.push_str(&rest[..b]);
                *in_block = true;
                rest = &rest[b + 2..];
            }
            (None, Some(l)) => {
                out.push_str(&rest[..l]);
                return out;
            }
            (None, None) => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

/// Closing braces and similar carry no statement.
fn is_punctuation_only(code: &str) -> bool {
    code.chars().all(|c| matches!(c, '{' | '}' | '(' | ')' | '[' | ']' | ';' | ','))
}

#[cfg(test)]
#[path = "instrument_tests.rs"]
mod tests;
