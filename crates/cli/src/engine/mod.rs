// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Execution engine.
//!
//! Runs units on a fixed worker pool. Every unit gets its own module
//! registry, scratch directory and coverage recorder, and runs on a
//! dedicated thread watched by the worker: a panic or an overrun only
//! affects that unit. Results come back in discovery order whatever the
//! completion order.

mod executor;
mod loader;
mod process;
mod result;

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;

use crate::config::{Config, defaults};
use crate::coverage::{CoverageRecorder, CoverageSample};
use crate::discovery::{TestUnit, UnitId};
use crate::error::Error;
use crate::history::DurationHistory;
use crate::resolver::PathResolver;

pub use executor::{CancelToken, Completion, UnitContext, UnitExecutor};
pub use loader::{ModuleRegistry, scan_imports};
pub use process::ProcessExecutor;
pub use result::{AssertionFailure, ExecutionResult, FailureDetail, Outcome};

/// Engine settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub root_dir: PathBuf,
    /// Upper bound on concurrently running units.
    pub workers: usize,
    /// Per-unit timeout.
    pub timeout: Duration,
    /// Cancel the run after this many non-passing units (0 = never).
    pub bail: usize,
    pub collect_coverage: bool,
}

impl EngineConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            root_dir: config.root_dir.clone(),
            workers: effective_workers(config.max_workers),
            timeout: Duration::from_millis(config.test_timeout),
            bail: config.bail,
            collect_coverage: config.collect_coverage,
        }
    }
}

/// `min(requested, available_parallelism)`, at least 1.
pub fn effective_workers(requested: Option<usize>) -> usize {
    let available = thread::available_parallelism().map_or(1, |n| n.get());
    requested.map_or(available, |n| n.min(available)).max(1)
}

/// Outcome of a whole run.
#[derive(Debug, Default)]
pub struct RunResults {
    /// One result per executed unit, in discovery order.
    pub results: Vec<ExecutionResult>,
    /// Units never started (or stopped) because the run was cancelled.
    pub abandoned: Vec<UnitId>,
}

impl RunResults {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Ids of units that did not pass.
    pub fn non_passing(&self) -> Vec<UnitId> {
        self.results
            .iter()
            .filter(|r| !r.is_passed())
            .map(|r| r.unit_id.clone())
            .collect()
    }

    pub fn samples(&self) -> impl Iterator<Item = &CoverageSample> {
        self.results.iter().map(|r| &r.coverage)
    }
}

/// Runs test units.
pub struct ExecutionEngine {
    config: EngineConfig,
    resolver: Arc<PathResolver>,
    executor: Arc<dyn UnitExecutor>,
    cancel: CancelToken,
    history: Option<DurationHistory>,
}

impl ExecutionEngine {
    pub fn new(
        config: EngineConfig,
        resolver: Arc<PathResolver>,
        executor: Arc<dyn UnitExecutor>,
    ) -> Self {
        Self {
            config,
            resolver,
            executor,
            cancel: CancelToken::new(),
            history: None,
        }
    }

    /// Use an externally owned cancel token (e.g. one set by Ctrl-C).
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Schedule units by their previous durations.
    pub fn with_history(mut self, history: DurationHistory) -> Self {
        self.history = Some(history);
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run a single unit in isolation.
    pub fn run(&self, unit: &TestUnit) -> ExecutionResult {
        self.execute(unit).unwrap_or_else(|| {
            ExecutionResult::errored(
                unit.id.clone(),
                Duration::ZERO,
                FailureDetail::Crash {
                    message: "run cancelled".to_string(),
                },
            )
        })
    }

    /// Run every unit, at most `workers` at a time.
    pub fn run_all(&self, units: &[TestUnit]) -> RunResults {
        if units.is_empty() {
            return RunResults::default();
        }

        let order = match &self.history {
            Some(history) => history.schedule(units),
            None => (0..units.len()).collect(),
        };
        let workers = self.config.workers.clamp(1, units.len());
        tracing::debug!("running {} unit(s) on {} worker(s)", units.len(), workers);

        let (queue_tx, queue_rx) = crossbeam_channel::unbounded::<usize>();
        for idx in order {
            let _ = queue_tx.send(idx);
        }
        drop(queue_tx);

        let (done_tx, done_rx) = crossbeam_channel::unbounded();
        let non_passing = AtomicUsize::new(0);

        let work = || {
            while let Ok(idx) = queue_rx.recv() {
                let Some(unit) = units.get(idx) else {
                    continue;
                };
                let result = if self.cancel.is_cancelled() {
                    None
                } else {
                    self.execute(unit)
                };
                if let Some(r) = &result
                    && !r.is_passed()
                {
                    let count = non_passing.fetch_add(1, Ordering::SeqCst) + 1;
                    if self.config.bail > 0 && count >= self.config.bail && !self.cancel.is_cancelled() {
                        tracing::info!("bail: {} non-passing unit(s), cancelling run", count);
                        self.cancel.cancel();
                    }
                }
                let _ = done_tx.send((idx, result));
            }
        };

        match rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("testgate-worker-{i}"))
            .build()
        {
            Ok(pool) => pool.scope(|s| {
                for _ in 0..workers {
                    s.spawn(|_| work());
                }
            }),
            Err(e) => {
                tracing::warn!("cannot build worker pool ({}), running sequentially", e);
                work();
            }
        }
        drop(done_tx);

        let mut slots: Vec<Option<ExecutionResult>> = (0..units.len()).map(|_| None).collect();
        for (idx, result) in done_rx.iter() {
            if let Some(slot) = slots.get_mut(idx) {
                *slot = result;
            }
        }

        let mut run = RunResults::default();
        for (unit, slot) in units.iter().zip(slots) {
            match slot {
                Some(result) => run.results.push(result),
                None => run.abandoned.push(unit.id.clone()),
            }
        }
        run
    }

    /// Load and execute one unit. `None` means the run was cancelled while
    /// the unit ran.
    fn execute(&self, unit: &TestUnit) -> Option<ExecutionResult> {
        let started = Instant::now();
        let id = unit.id.clone();

        let registry = match ModuleRegistry::load(&unit.path, &self.resolver) {
            Ok(registry) => registry,
            Err(Error::UnresolvedModule { specifier, from }) => {
                tracing::debug!("unit {}: unresolved import '{}'", id, specifier);
                let detail = FailureDetail::UnresolvedModule { specifier, from };
                return Some(ExecutionResult::errored(id, started.elapsed(), detail));
            }
            Err(e) => return Some(crashed(id, started, e.to_string())),
        };

        let scratch = match tempfile::Builder::new().prefix("testgate-unit-").tempdir() {
            Ok(dir) => dir,
            Err(e) => return Some(crashed(id, started, format!("cannot create scratch directory: {e}"))),
        };

        let abandoned = CancelToken::new();
        let ctx = UnitContext {
            root_dir: self.config.root_dir.clone(),
            registry,
            scratch,
            coverage: CoverageRecorder::new(self.config.collect_coverage),
            timeout: self.config.timeout,
            deadline: Instant::now() + self.config.timeout,
            cancel: self.cancel.clone(),
            abandoned: abandoned.clone(),
        };

        let (tx, rx) = crossbeam_channel::bounded(1);
        let executor = Arc::clone(&self.executor);
        let owned = unit.clone();
        let spawned = thread::Builder::new()
            .name(format!("testgate-unit-{}", unit.ordinal))
            .spawn(move || {
                let mut ctx = ctx;
                let completion =
                    panic::catch_unwind(AssertUnwindSafe(|| executor.execute(&owned, &mut ctx)))
                        .unwrap_or_else(|payload| {
                            Completion::Errored(FailureDetail::Crash {
                                message: panic_message(payload.as_ref()),
                            })
                        });
                let _ = tx.send((completion, ctx.coverage.into_sample()));
            });
        if let Err(e) = spawned {
            return Some(crashed(id, started, format!("cannot start unit thread: {e}")));
        }

        let watchdog = self.config.timeout + Duration::from_millis(defaults::execution::WATCHDOG_GRACE_MS);
        let (completion, sample) = match rx.recv_timeout(watchdog) {
            Ok(done) => done,
            Err(RecvTimeoutError::Timeout) => {
                abandoned.cancel();
                tracing::warn!("unit {} abandoned after {:?}", id, self.config.timeout);
                let detail = FailureDetail::Timeout {
                    limit_ms: self.config.timeout.as_millis() as u64,
                };
                (Completion::Errored(detail), CoverageSample::default())
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Some(crashed(id, started, "unit thread exited without a result".to_string()));
            }
        };

        let duration = started.elapsed();
        tracing::debug!("unit {} finished in {:?}: {:?}", id, duration, completion);
        match completion {
            Completion::Passed => Some(ExecutionResult::passed(id, duration, sample)),
            Completion::Failed(detail) => Some(ExecutionResult::failed(id, duration, detail, sample)),
            Completion::Errored(detail) => Some(ExecutionResult::errored(id, duration, detail)),
            Completion::Cancelled => None,
        }
    }
}

fn crashed(id: UnitId, started: Instant, message: String) -> ExecutionResult {
    ExecutionResult::errored(id, started.elapsed(), FailureDetail::Crash { message })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let text = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("unit panicked: {text}")
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
