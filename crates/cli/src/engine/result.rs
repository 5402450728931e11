// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-unit execution results.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::coverage::CoverageSample;
use crate::discovery::UnitId;

/// How a unit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Every assertion succeeded.
    Passed,
    /// At least one assertion failed.
    Failed,
    /// A fault outside the assertion machinery (load error, timeout, crash).
    Errored,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed => "failed",
            Outcome::Errored => "errored",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a unit did not pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureDetail {
    Assertion {
        title: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        expected: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        actual: Option<String>,
    },
    Timeout {
        limit_ms: u64,
    },
    UnresolvedModule {
        specifier: String,
        from: PathBuf,
    },
    Crash {
        message: String,
    },
}

impl FailureDetail {
    /// One-line description for reports.
    pub fn summary(&self) -> String {
        match self {
            FailureDetail::Assertion {
                title,
                message,
                expected,
                actual,
            } => {
                let mut line = format!("{title}: {message}");
                if let (Some(expected), Some(actual)) = (expected, actual) {
                    line.push_str(&format!(" (expected {expected}, received {actual})"));
                }
                line
            }
            FailureDetail::Timeout { limit_ms } => format!("exceeded timeout of {limit_ms} ms"),
            FailureDetail::UnresolvedModule { specifier, from } => {
                format!("cannot find module '{specifier}' from {}", from.display())
            }
            FailureDetail::Crash { message } => message.clone(),
        }
    }
}

/// A failed assertion raised by an in-process unit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssertionFailure {
    pub title: String,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl AssertionFailure {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_values(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }
}

impl From<AssertionFailure> for FailureDetail {
    fn from(f: AssertionFailure) -> Self {
        FailureDetail::Assertion {
            title: f.title,
            message: f.message,
            expected: f.expected,
            actual: f.actual,
        }
    }
}

/// Result of running one unit.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub unit_id: UnitId,
    pub outcome: Outcome,
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureDetail>,
    #[serde(skip)]
    pub coverage: CoverageSample,
}

impl ExecutionResult {
    pub fn passed(unit_id: UnitId, duration: Duration, coverage: CoverageSample) -> Self {
        Self {
            unit_id,
            outcome: Outcome::Passed,
            duration,
            failure: None,
            coverage,
        }
    }

    pub fn failed(
        unit_id: UnitId,
        duration: Duration,
        failure: FailureDetail,
        coverage: CoverageSample,
    ) -> Self {
        Self {
            unit_id,
            outcome: Outcome::Failed,
            duration,
            failure: Some(failure),
            coverage,
        }
    }

    /// Errored results carry no coverage.
    pub fn errored(unit_id: UnitId, duration: Duration, failure: FailureDetail) -> Self {
        Self {
            unit_id,
            outcome: Outcome::Errored,
            duration,
            failure: Some(failure),
            coverage: CoverageSample::default(),
        }
    }

    pub fn is_passed(&self) -> bool {
        self.outcome == Outcome::Passed
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}
