// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution backends for per-frame analysis computations.
//!
//! Every backend maps a pure [`WorkFunction`] over an ordered list of
//! independent computation items and returns the results in input order.
//! Backends differ only in where each call runs.
//!
//! # Available Backends
//!
//! ## Serial
//! In-process, sequential application on the calling thread:
//! - **Reference**: ground truth the parallel backends are compared against
//! - **Fallback**: works where processes cannot be spawned
//!
//! ## Process Pool
//! A fixed pool of `n_workers` worker processes fed contiguous chunks:
//! - **Isolation**: the work function runs only in the workers
//! - **Lifetime**: the pool is created and torn down inside one `apply`
//!
//! ## Task Graph
//! One deferred task per computation evaluated by the task-graph engine:
//! - **Granularity**: every task is its own dispatch unit
//! - **Optional**: requires the `task-graph` cargo feature, checked at construction
//!
//! # Architecture
//!
//! ```text
//! Configuration → BackendFactory → Backend (validated) → apply(function, computations)
//! ```
//!
//! Construction always validates: a backend instance that exists has passed
//! every fatal rule of its [`ValidationPolicy`].
//!
//! # Examples
//!
//! ```rust
//! use analysis_backends::backends::{BackendFactory, BackendKind};
//! use analysis_backends::builtins::Square;
//! use analysis_backends::traits::ExecutionBackend;
//!
//! let backend = BackendFactory::create(BackendKind::Serial, 1)?;
//! assert_eq!(backend.apply(&Square, &[1, 2, 3])?, vec![1, 4, 9]);
//! # Ok::<(), analysis_backends::errors::BackendError>(())
//! ```

pub mod factory;
pub mod process_pool;
pub mod serial;
pub mod task_graph;
pub mod validation;

pub use crate::config::BackendKind;
pub use factory::BackendFactory;
pub use process_pool::ProcessPoolBackend;
pub use serial::SerialBackend;
pub use task_graph::TaskGraphBackend;
pub use validation::ValidationRules;

use std::time::Instant;

use crate::errors::{BackendError, ConfigurationWarning};
use crate::observability::messages::backend::{ApplyCompleted, ApplyFailed, ApplyStarted};
use crate::observability::messages::StructuredLog;
use crate::traits::{ExecutionBackend, WorkFunction};

/// A validated backend of any strategy.
#[derive(Debug)]
pub enum Backend {
    Serial(SerialBackend),
    ProcessPool(ProcessPoolBackend),
    TaskGraph(TaskGraphBackend),
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::Serial(_) => BackendKind::Serial,
            Backend::ProcessPool(_) => BackendKind::ProcessPool,
            Backend::TaskGraph(_) => BackendKind::TaskGraph,
        }
    }
}

impl ExecutionBackend for Backend {
    fn name(&self) -> &'static str {
        match self {
            Backend::Serial(backend) => backend.name(),
            Backend::ProcessPool(backend) => backend.name(),
            Backend::TaskGraph(backend) => backend.name(),
        }
    }

    fn n_workers(&self) -> usize {
        match self {
            Backend::Serial(backend) => backend.n_workers(),
            Backend::ProcessPool(backend) => backend.n_workers(),
            Backend::TaskGraph(backend) => backend.n_workers(),
        }
    }

    fn warnings(&self) -> &[ConfigurationWarning] {
        match self {
            Backend::Serial(backend) => backend.warnings(),
            Backend::ProcessPool(backend) => backend.warnings(),
            Backend::TaskGraph(backend) => backend.warnings(),
        }
    }

    fn apply<F: WorkFunction>(
        &self,
        function: &F,
        computations: &[F::Input],
    ) -> Result<Vec<F::Output>, BackendError> {
        match self {
            Backend::Serial(backend) => backend.apply(function, computations),
            Backend::ProcessPool(backend) => backend.apply(function, computations),
            Backend::TaskGraph(backend) => backend.apply(function, computations),
        }
    }
}

impl From<SerialBackend> for Backend {
    fn from(backend: SerialBackend) -> Self {
        Backend::Serial(backend)
    }
}

impl From<ProcessPoolBackend> for Backend {
    fn from(backend: ProcessPoolBackend) -> Self {
        Backend::ProcessPool(backend)
    }
}

impl From<TaskGraphBackend> for Backend {
    fn from(backend: TaskGraphBackend) -> Self {
        Backend::TaskGraph(backend)
    }
}

/// Run one `apply` inside its span, logging start, completion or failure.
pub(crate) fn instrumented<T>(
    backend: &'static str,
    function: &str,
    computation_count: usize,
    n_workers: usize,
    run: impl FnOnce() -> Result<T, BackendError>,
) -> Result<T, BackendError> {
    let started = ApplyStarted {
        backend,
        function,
        computation_count,
        n_workers,
    };
    let span = started.span("apply");
    let _guard = span.enter();
    started.log();

    let start = Instant::now();
    let result = run();
    match &result {
        Ok(_) => ApplyCompleted {
            backend,
            function,
            computation_count,
            duration: start.elapsed(),
        }
        .log(),
        Err(error) => ApplyFailed {
            backend,
            function,
            error,
        }
        .log(),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::Square;

    #[test]
    fn test_backend_enum_delegates() {
        let backend: Backend = SerialBackend::new(3).unwrap().into();

        assert_eq!(backend.kind(), BackendKind::Serial);
        assert_eq!(backend.name(), "serial");
        assert_eq!(backend.n_workers(), 3);
        assert_eq!(backend.warnings().len(), 1);
        assert_eq!(backend.apply(&Square, &[2, 3]).unwrap(), vec![4, 9]);
    }

    #[test]
    fn test_instrumented_passes_result_through() {
        let ok = instrumented("serial", "square", 0, 1, || Ok(7));
        assert_eq!(ok.unwrap(), 7);

        let err: Result<(), _> = instrumented("serial", "square", 1, 1, || {
            Err(BackendError::WorkerExecution {
                index: 0,
                message: "boom".to_string(),
            })
        });
        assert!(matches!(err, Err(BackendError::WorkerExecution { index: 0, .. })));
    }
}
