// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The unit execution seam.
//!
//! An executor receives a fresh [`UnitContext`] per unit and reports how the
//! unit completed. Coverage goes into the context's recorder.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tempfile::TempDir;

use super::loader::ModuleRegistry;
use super::result::{AssertionFailure, FailureDetail};
use crate::coverage::CoverageRecorder;
use crate::discovery::TestUnit;

/// Shared stop flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Isolated state for one unit. Dropped (scratch directory included) when
/// the unit ends.
pub struct UnitContext {
    pub root_dir: PathBuf,
    pub registry: ModuleRegistry,
    pub scratch: TempDir,
    pub coverage: CoverageRecorder,
    pub timeout: Duration,
    pub deadline: Instant,
    /// Run-wide cancellation (Ctrl-C, bail).
    pub cancel: CancelToken,
    /// Set by the watchdog when this unit is abandoned.
    pub abandoned: CancelToken,
}

impl UnitContext {
    pub fn is_past_deadline(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Whether the executor should stop early.
    pub fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || self.abandoned.is_cancelled()
    }
}

/// How an executor finished a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Passed,
    Failed(FailureDetail),
    Errored(FailureDetail),
    /// Stopped because the run was cancelled; the result is discarded.
    Cancelled,
}

/// Runs a single unit. Implementations are shared across workers.
pub trait UnitExecutor: Send + Sync {
    fn execute(&self, unit: &TestUnit, ctx: &mut UnitContext) -> Completion;
}

/// In-process units: a closure whose `Err` is a failed assertion.
impl<F> UnitExecutor for F
where
    F: Fn(&TestUnit, &mut UnitContext) -> Result<(), AssertionFailure> + Send + Sync,
{
    fn execute(&self, unit: &TestUnit, ctx: &mut UnitContext) -> Completion {
        match self(unit, ctx) {
            Ok(()) => Completion::Passed,
            Err(failure) => Completion::Failed(failure.into()),
        }
    }
}
