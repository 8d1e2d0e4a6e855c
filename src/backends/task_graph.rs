// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Task-graph backend: one deferred task per computation, scheduled one task per
//! dispatch unit onto a set of worker processes.
//!
//! The engine lives in [`crate::engine`] and only exists when the crate is built
//! with the `task-graph` feature. Its presence is probed while the backend is
//! constructed, so a build without it fails with
//! [`BackendError::DependencyMissing`] before any work is submitted.

use std::fmt;

use crate::backends::instrumented;
use crate::backends::validation::{validate, ValidationRules};
use crate::errors::{BackendError, ConfigurationWarning};
use crate::observability::messages::backend::BackendConstructed;
use crate::observability::messages::StructuredLog;
use crate::traits::{ExecutionBackend, ValidationPolicy, WorkFunction};
use crate::worker::WorkerCommand;

/// Capability named in the error raised when the engine is absent
pub const ENGINE_CAPABILITY: &str = "task-graph engine";

const ENGINE_GUIDANCE: &str =
    "rebuild analysis-backends with the `task-graph` cargo feature enabled";

/// Whether this build carries the task-graph engine.
pub fn engine_available() -> bool {
    cfg!(feature = "task-graph")
}

/// Backend that evaluates a deferred task graph with one dispatch unit per task.
///
/// # Example
/// ```rust,no_run
/// use analysis_backends::backends::TaskGraphBackend;
/// use analysis_backends::builtins::Square;
/// use analysis_backends::traits::ExecutionBackend;
///
/// let backend = TaskGraphBackend::new(4)?;
/// let results = backend.apply(&Square, &[1, 2, 3, 4, 5])?;
/// assert_eq!(results, vec![1, 4, 9, 16, 25]);
/// # Ok::<(), analysis_backends::errors::BackendError>(())
/// ```
pub struct TaskGraphBackend {
    n_workers: i64,
    engine_probe: fn() -> bool,
    worker_command: Option<WorkerCommand>,
    warnings: Vec<ConfigurationWarning>,
}

impl fmt::Debug for TaskGraphBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskGraphBackend")
            .field("n_workers", &self.n_workers)
            .field("worker_command", &self.worker_command)
            .field("warnings", &self.warnings)
            .finish()
    }
}

impl TaskGraphBackend {
    pub fn new(n_workers: i64) -> Result<Self, BackendError> {
        Self::with_engine_probe(n_workers, engine_available)
    }

    /// Construct with a custom engine availability probe.
    pub fn with_engine_probe(n_workers: i64, engine_probe: fn() -> bool) -> Result<Self, BackendError> {
        let mut backend = Self {
            n_workers,
            engine_probe,
            worker_command: None,
            warnings: Vec::new(),
        };
        backend.warnings = validate(&backend)?;

        BackendConstructed {
            backend: Self::NAME,
            n_workers: backend.n_workers(),
            warning_count: backend.warnings.len(),
        }
        .log();
        Ok(backend)
    }

    /// Launch workers with `command` instead of re-invoking the current executable.
    pub fn with_worker_command(mut self, command: WorkerCommand) -> Self {
        self.worker_command = Some(command);
        self
    }

    #[cfg(feature = "task-graph")]
    fn evaluate<F: WorkFunction>(
        &self,
        function: &F,
        computations: &[F::Input],
    ) -> Result<Vec<F::Output>, BackendError> {
        use std::sync::Arc;

        use crate::engine::{self, EvaluateOptions, ProcessSpawner, TaskGraph};
        use crate::worker::protocol::decode_outputs;

        let graph = TaskGraph::from_computations(function, computations)?;
        if graph.is_empty() {
            return Ok(Vec::new());
        }

        let command = WorkerCommand::resolve(self.worker_command.as_ref())?;
        let spawner = Arc::new(ProcessSpawner::new(command));
        let options = EvaluateOptions {
            n_workers: self.n_workers(),
            chunksize: 1,
            fixed_pool: false,
        };
        let outputs = engine::evaluate(graph.into_envelopes(), spawner, options)?;
        decode_outputs::<F>(outputs)
    }

    #[cfg(not(feature = "task-graph"))]
    fn evaluate<F: WorkFunction>(
        &self,
        _function: &F,
        _computations: &[F::Input],
    ) -> Result<Vec<F::Output>, BackendError> {
        Err(BackendError::DependencyMissing {
            backend: Self::NAME,
            capability: ENGINE_CAPABILITY.to_string(),
            guidance: ENGINE_GUIDANCE.to_string(),
        })
    }
}

impl ValidationPolicy for TaskGraphBackend {
    const NAME: &'static str = "task_graph";

    fn requested_workers(&self) -> i64 {
        self.n_workers
    }

    fn rules(&self) -> ValidationRules {
        ValidationRules::base(self.n_workers)
            .require((self.engine_probe)(), ENGINE_CAPABILITY, ENGINE_GUIDANCE)
            .warn_unless(
                self.n_workers != 1,
                "n_workers=1 evaluates every task in a single worker process; use backend='serial' to avoid the process overhead",
            )
    }
}

impl ExecutionBackend for TaskGraphBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn n_workers(&self) -> usize {
        self.n_workers as usize
    }

    fn warnings(&self) -> &[ConfigurationWarning] {
        &self.warnings
    }

    fn apply<F: WorkFunction>(
        &self,
        function: &F,
        computations: &[F::Input],
    ) -> Result<Vec<F::Output>, BackendError> {
        instrumented(Self::NAME, F::NAME, computations.len(), self.n_workers(), || {
            self.evaluate(function, computations)
        })
    }
}
