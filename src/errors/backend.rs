// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while constructing a backend or applying a work function.

use std::fmt;
use thiserror::Error;

/// Errors that can occur during backend construction or `apply`.
///
/// Construction-time variants (`Configuration`, `DependencyMissing`) mean no
/// backend instance exists. Every other variant aborts a single `apply` call
/// and carries the underlying cause; no partial results are ever returned.
#[derive(Debug, Error)]
pub enum BackendError {
    /// A fatal validation rule was violated (e.g. a non-positive worker count)
    #[error("invalid {backend} backend configuration: {message}")]
    Configuration {
        backend: &'static str,
        message: String,
    },

    /// An optional execution engine required by the backend is not present
    #[error("{backend} backend requires the {capability}: {guidance}")]
    DependencyMissing {
        backend: &'static str,
        capability: String,
        guidance: String,
    },

    /// A work function or computation item could not cross the process boundary
    #[error("cannot transfer {subject} across the process boundary: {reason}")]
    Transfer { subject: String, reason: String },

    /// The work function failed on one computation item
    #[error("work function failed on computation {index}: {message}")]
    WorkerExecution { index: usize, message: String },

    /// The worker executable could not be started
    #[error("failed to start worker process '{program}': {source}")]
    WorkerSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A worker exited or broke the wire protocol while work was outstanding
    #[error("worker {worker} was lost: {reason}")]
    WorkerLost { worker: usize, reason: String },

    /// The task-graph engine failed outside of any single task
    #[error("task-graph engine failure: {message}")]
    Engine { message: String },
}

impl BackendError {
    /// Whether this error can only be produced while constructing a backend.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            BackendError::Configuration { .. } | BackendError::DependencyMissing { .. }
        )
    }
}

/// Non-fatal diagnostic produced by a violated advisory validation rule.
///
/// Construction proceeds; the warning is logged and kept on the backend so
/// drivers can surface it without a log subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationWarning {
    pub backend: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigurationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} backend: {}", self.backend, self.message)
    }
}
