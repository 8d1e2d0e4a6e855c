// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for backend lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Backend construction after successful validation
//! * `apply` lifecycle (start, completion, failure)

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Backend constructed and validated.
///
/// # Log Level
/// `debug!` - Construction happens once per analysis run
///
/// # Example
/// ```
/// use analysis_backends::observability::messages::backend::BackendConstructed;
///
/// let msg = BackendConstructed {
///     backend: "serial",
///     n_workers: 1,
///     warning_count: 0,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct BackendConstructed<'a> {
    pub backend: &'a str,
    pub n_workers: usize,
    pub warning_count: usize,
}

impl Display for BackendConstructed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Constructed {} backend: n_workers={}, warnings={}",
            self.backend, self.n_workers, self.warning_count
        )
    }
}

impl StructuredLog for BackendConstructed<'_> {
    fn log(&self) {
        tracing::debug!(
            backend = self.backend,
            n_workers = self.n_workers,
            warning_count = self.warning_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "backend_constructed",
            span_name = name,
            backend = self.backend,
            n_workers = self.n_workers,
        )
    }
}

/// `apply` started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use analysis_backends::observability::messages::backend::ApplyStarted;
///
/// let msg = ApplyStarted {
///     backend: "task_graph",
///     function: "square",
///     computation_count: 100,
///     n_workers: 8,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ApplyStarted<'a> {
    pub backend: &'a str,
    pub function: &'a str,
    pub computation_count: usize,
    pub n_workers: usize,
}

impl Display for ApplyStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Applying '{}' with {} backend: {} computations, n_workers={}",
            self.function, self.backend, self.computation_count, self.n_workers
        )
    }
}

impl StructuredLog for ApplyStarted<'_> {
    fn log(&self) {
        tracing::info!(
            backend = self.backend,
            function = self.function,
            computation_count = self.computation_count,
            n_workers = self.n_workers,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "apply",
            span_name = name,
            backend = self.backend,
            function = self.function,
            computation_count = self.computation_count,
            n_workers = self.n_workers,
        )
    }
}

/// `apply` completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use analysis_backends::observability::messages::backend::ApplyCompleted;
/// use std::time::Duration;
///
/// let msg = ApplyCompleted {
///     backend: "process_pool",
///     function: "square",
///     computation_count: 5,
///     duration: Duration::from_millis(120),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ApplyCompleted<'a> {
    pub backend: &'a str,
    pub function: &'a str,
    pub computation_count: usize,
    pub duration: std::time::Duration,
}

impl Display for ApplyCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Applied '{}' with {} backend: {} computations in {:?}",
            self.function, self.backend, self.computation_count, self.duration
        )
    }
}

impl StructuredLog for ApplyCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            backend = self.backend,
            function = self.function,
            computation_count = self.computation_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "apply_completed",
            span_name = name,
            backend = self.backend,
            function = self.function,
            duration = ?self.duration,
        )
    }
}

/// `apply` failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use analysis_backends::observability::messages::backend::ApplyFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "worker crashed");
/// let msg = ApplyFailed {
///     backend: "process_pool",
///     function: "square",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ApplyFailed<'a> {
    pub backend: &'a str,
    pub function: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ApplyFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Applying '{}' with {} backend failed: {}",
            self.function, self.backend, self.error
        )
    }
}

impl StructuredLog for ApplyFailed<'_> {
    fn log(&self) {
        tracing::error!(
            backend = self.backend,
            function = self.function,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "apply_failed",
            span_name = name,
            backend = self.backend,
            function = self.function,
            error = %self.error,
        )
    }
}
