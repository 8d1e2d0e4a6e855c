// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Process-pool backend: a fixed set of worker processes pulling chunks of work.
//!
//! ## Execution Strategy
//!
//! 1. **Transfer check**: the function state and every computation are
//!    serialized up front. Nothing is spawned if any of them cannot be.
//! 2. **Pool setup**: exactly `n_workers` worker processes are started on the
//!    scheduler's runtime, whatever the number of chunks.
//! 3. **Chunked dispatch**: the computation list is cut into contiguous chunks
//!    queued in order; each worker takes the next chunk whenever it is idle.
//! 4. **Fail-fast**: the first failure is recorded and cancels the pool. No
//!    further chunk is dispatched and every worker is killed.
//! 5. **Ordered collection**: outputs are stored by computation index, so the
//!    result order is the input order whatever the completion order was.
//!
//! The pool lives for one `apply` call only.

use std::sync::Arc;

use crate::backends::instrumented;
use crate::backends::validation::{validate, ValidationRules};
use crate::engine::{self, EvaluateOptions, ProcessSpawner, WorkerSpawner};
use crate::errors::{BackendError, ConfigurationWarning};
use crate::observability::messages::backend::BackendConstructed;
use crate::observability::messages::StructuredLog;
use crate::partition::default_chunksize;
use crate::traits::{ExecutionBackend, ValidationPolicy, WorkFunction};
use crate::worker::protocol::{decode_outputs, encode_tasks, Payload, TaskEnvelope};
use crate::worker::WorkerCommand;

/// Backend that maps the function over a pool of worker processes.
///
/// # Example
/// ```rust,no_run
/// use analysis_backends::backends::ProcessPoolBackend;
/// use analysis_backends::builtins::Square;
/// use analysis_backends::traits::ExecutionBackend;
/// use analysis_backends::worker::WorkerCommand;
///
/// let backend = ProcessPoolBackend::new(4)?
///     .with_worker_command(WorkerCommand::new("/opt/analysis/bin/driver").arg("worker"));
/// let results = backend.apply(&Square, &[1, 2, 3, 4, 5])?;
/// assert_eq!(results, vec![1, 4, 9, 16, 25]);
/// # Ok::<(), analysis_backends::errors::BackendError>(())
/// ```
#[derive(Debug)]
pub struct ProcessPoolBackend {
    n_workers: i64,
    chunksize: Option<usize>,
    worker_command: Option<WorkerCommand>,
    warnings: Vec<ConfigurationWarning>,
}

impl ProcessPoolBackend {
    pub fn new(n_workers: i64) -> Result<Self, BackendError> {
        let mut backend = Self {
            n_workers,
            chunksize: None,
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

    /// Fixed number of computations per dispatched chunk (at least one).
    pub fn with_chunksize(mut self, chunksize: usize) -> Self {
        self.chunksize = Some(chunksize.max(1));
        self
    }

    pub fn chunksize_for(&self, computation_count: usize) -> usize {
        self.chunksize
            .unwrap_or_else(|| default_chunksize(computation_count, self.n_workers()))
    }

    fn run_pool(
        &self,
        tasks: Vec<TaskEnvelope>,
        spawner: Arc<dyn WorkerSpawner>,
    ) -> Result<Vec<Payload>, BackendError> {
        let options = EvaluateOptions {
            n_workers: self.n_workers(),
            chunksize: self.chunksize_for(tasks.len()),
            fixed_pool: true,
        };
        engine::evaluate(tasks, spawner, options)
    }
}

impl ValidationPolicy for ProcessPoolBackend {
    const NAME: &'static str = "process_pool";

    fn requested_workers(&self) -> i64 {
        self.n_workers
    }

    fn rules(&self) -> ValidationRules {
        ValidationRules::base(self.n_workers).warn_unless(
            self.n_workers != 1,
            "n_workers=1 runs every computation in a single worker process; use backend='serial' to avoid the process overhead",
        )
    }
}

impl ExecutionBackend for ProcessPoolBackend {
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
            let tasks = encode_tasks(function, computations)?;
            if tasks.is_empty() {
                return Ok(Vec::new());
            }
            let command = WorkerCommand::resolve(self.worker_command.as_ref())?;
            let outputs = self.run_pool(tasks, Arc::new(ProcessSpawner::new(command)))?;
            decode_outputs::<F>(outputs)
        })
    }
}
