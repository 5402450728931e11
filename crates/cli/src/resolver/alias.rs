// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Alias rules: rewrite symbolic specifiers into path templates.
//!
//! Three pattern forms are accepted:
//! - regex (`^@/(.*)$`): groups are substituted as `$1`, `$2`, ... in targets
//! - single wildcard (`@/*`): the captured segment replaces `*` (or `$1`)
//! - literal (`lodash`): whole-specifier match, target used as-is

use regex::{Captures, Regex};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternKind {
    Regex,
    Wildcard,
    Literal,
}

/// A compiled alias rule.
#[derive(Debug, Clone)]
pub struct AliasRule {
    pattern: String,
    kind: PatternKind,
    matcher: Regex,
    targets: Vec<String>,
}

impl AliasRule {
    /// Compile a rule. Fails with a config error on invalid patterns,
    /// more than one wildcard, or no targets.
    pub fn new(pattern: &str, targets: Vec<String>) -> Result<Self> {
        if targets.is_empty() {
            return Err(Error::config(format!(
                "module_name_mapper '{pattern}' has no target"
            )));
        }

        let kind = classify(pattern);
        let source = match kind {
            PatternKind::Regex => pattern.to_string(),
            PatternKind::Wildcard => {
                if pattern.matches('*').count() > 1 {
                    return Err(Error::config(format!(
                        "module_name_mapper '{pattern}' has more than one wildcard"
                    )));
                }
                let (prefix, suffix) = pattern.split_once('*').unwrap_or((pattern, ""));
                format!("^{}(.*){}$", regex::escape(prefix), regex::escape(suffix))
            }
            PatternKind::Literal => format!("^{}$", regex::escape(pattern)),
        };

        let matcher = Regex::new(&source).map_err(|e| {
            Error::config(format!("invalid module_name_mapper pattern '{pattern}': {e}"))
        })?;

        Ok(Self {
            pattern: pattern.to_string(),
            kind,
            matcher,
            targets,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Candidate paths for `specifier`, in target order, or `None` if the
    /// rule does not match.
    pub fn apply(&self, specifier: &str) -> Option<Vec<String>> {
        let caps = self.matcher.captures(specifier)?;
        Some(
            self.targets
                .iter()
                .map(|target| self.substitute(target, &caps))
                .collect(),
        )
    }

    fn substitute(&self, template: &str, caps: &Captures<'_>) -> String {
        let expanded = expand_groups(template, caps);
        if self.kind == PatternKind::Wildcard {
            let segment = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            expanded.replacen('*', segment, 1)
        } else {
            expanded
        }
    }
}

/// Regex syntax markers; patterns without them are wildcard or literal.
fn classify(pattern: &str) -> PatternKind {
    let looks_like_regex = pattern.starts_with('^')
        || pattern.ends_with('$')
        || pattern.contains('(')
        || pattern.contains('\\')
        || pattern.contains('[');
    if looks_like_regex {
        PatternKind::Regex
    } else if pattern.contains('*') {
        PatternKind::Wildcard
    } else {
        PatternKind::Literal
    }
}

/// Replace `$N` with capture group N (empty when the group did not match).
fn expand_groups(template: &str, caps: &Captures<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        let start = i + 1;
        let mut end = start;
        while let Some(&(j, d)) = chars.peek() {
            if !d.is_ascii_digit() {
                break;
            }
            end = j + d.len_utf8();
            chars.next();
        }
        if end == start {
            out.push('$');
            continue;
        }
        if let Ok(index) = template[start..end].parse::<usize>() {
            out.push_str(caps.get(index).map(|m| m.as_str()).unwrap_or(""));
        }
    }
    out
}

#[cfg(test)]
#[path = "alias_tests.rs"]
mod tests;
