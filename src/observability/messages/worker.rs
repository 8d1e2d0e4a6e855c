// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for worker process lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Spawning and tearing down worker processes (parent side)
//! * Serving the worker protocol (child side)

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Worker process spawned.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
///
/// # Example
/// ```
/// use analysis_backends::observability::messages::worker::WorkerSpawned;
///
/// let msg = WorkerSpawned {
///     worker: 0,
///     pid: 4242,
///     program: "/usr/local/bin/analysis-backends",
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct WorkerSpawned<'a> {
    pub worker: usize,
    pub pid: u32,
    pub program: &'a str,
}

impl Display for WorkerSpawned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Spawned worker {} (pid {}) from '{}'",
            self.worker, self.pid, self.program
        )
    }
}

impl StructuredLog for WorkerSpawned<'_> {
    fn log(&self) {
        tracing::debug!(
            worker = self.worker,
            pid = self.pid,
            program = self.program,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "worker",
            span_name = name,
            worker = self.worker,
            pid = self.pid,
        )
    }
}

/// Worker process torn down.
///
/// `forced` is true when the worker was killed instead of shut down cleanly.
///
/// # Log Level
/// `debug!` for clean shutdowns, `warn!` for forced ones
///
/// # Example
/// ```
/// use analysis_backends::observability::messages::worker::WorkerTerminated;
///
/// let msg = WorkerTerminated {
///     worker: 1,
///     tasks_completed: 12,
///     forced: false,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct WorkerTerminated {
    pub worker: usize,
    pub tasks_completed: usize,
    pub forced: bool,
}

impl Display for WorkerTerminated {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let how = if self.forced { "killed" } else { "shut down" };
        write!(
            f,
            "Worker {} {} after {} tasks",
            self.worker, how, self.tasks_completed
        )
    }
}

impl StructuredLog for WorkerTerminated {
    fn log(&self) {
        if self.forced {
            tracing::warn!(
                worker = self.worker,
                tasks_completed = self.tasks_completed,
                forced = self.forced,
                "{}", self
            );
        } else {
            tracing::debug!(
                worker = self.worker,
                tasks_completed = self.tasks_completed,
                forced = self.forced,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "worker_terminated",
            span_name = name,
            worker = self.worker,
            forced = self.forced,
        )
    }
}

/// Worker started serving requests on its standard streams.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
///
/// # Example
/// ```
/// use analysis_backends::observability::messages::worker::WorkerServing;
///
/// let functions = vec!["square", "scale"];
/// let msg = WorkerServing {
///     functions: &functions,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct WorkerServing<'a> {
    pub functions: &'a [&'a str],
}

impl Display for WorkerServing<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker serving functions: [{}]", self.functions.join(", "))
    }
}

impl StructuredLog for WorkerServing<'_> {
    fn log(&self) {
        tracing::debug!(
            functions = self.functions.join(","),
            function_count = self.functions.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "worker_serving",
            span_name = name,
            function_count = self.functions.len(),
        )
    }
}

/// A task failed inside the worker.
///
/// # Log Level
/// `warn!` - The parent decides whether the failure is fatal
///
/// # Example
/// ```
/// use analysis_backends::observability::messages::worker::TaskFailedInWorker;
///
/// let msg = TaskFailedInWorker {
///     function: "square",
///     index: 2,
///     kind: "execution",
///     message: "value out of range",
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct TaskFailedInWorker<'a> {
    pub function: &'a str,
    pub index: usize,
    pub kind: &'a str,
    pub message: &'a str,
}

impl Display for TaskFailedInWorker<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Task {} of '{}' failed ({}): {}",
            self.index, self.function, self.kind, self.message
        )
    }
}

impl StructuredLog for TaskFailedInWorker<'_> {
    fn log(&self) {
        tracing::warn!(
            function = self.function,
            index = self.index,
            kind = self.kind,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "task_failed",
            span_name = name,
            function = self.function,
            index = self.index,
        )
    }
}
