// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for task-graph engine events.
//!
//! This module contains message types for logging events related to:
//! * Deferred task graph construction
//! * Scheduler evaluation (start, cancellation)

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Task graph built from a computation list.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
///
/// # Example
/// ```
/// use analysis_backends::observability::messages::engine::TaskGraphBuilt;
///
/// let msg = TaskGraphBuilt {
///     function: "square",
///     task_count: 5,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct TaskGraphBuilt<'a> {
    pub function: &'a str,
    pub task_count: usize,
}

impl Display for TaskGraphBuilt<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Built task graph for '{}': {} independent tasks",
            self.function, self.task_count
        )
    }
}

impl StructuredLog for TaskGraphBuilt<'_> {
    fn log(&self) {
        tracing::debug!(
            function = self.function,
            task_count = self.task_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "task_graph",
            span_name = name,
            function = self.function,
            task_count = self.task_count,
        )
    }
}

/// Scheduler evaluation started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use analysis_backends::observability::messages::engine::EvaluationStarted;
///
/// let msg = EvaluationStarted {
///     task_count: 100,
///     unit_count: 100,
///     n_workers: 4,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct EvaluationStarted {
    pub task_count: usize,
    pub unit_count: usize,
    pub n_workers: usize,
}

impl Display for EvaluationStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Evaluating {} tasks in {} dispatch units, n_workers={}",
            self.task_count, self.unit_count, self.n_workers
        )
    }
}

impl StructuredLog for EvaluationStarted {
    fn log(&self) {
        tracing::info!(
            task_count = self.task_count,
            unit_count = self.unit_count,
            n_workers = self.n_workers,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "evaluation",
            span_name = name,
            task_count = self.task_count,
            n_workers = self.n_workers,
        )
    }
}

/// Evaluation cancelled after the first failure.
///
/// # Log Level
/// `warn!` - Remaining dispatch units are dropped
///
/// # Example
/// ```
/// use analysis_backends::observability::messages::engine::EvaluationCancelled;
///
/// let msg = EvaluationCancelled {
///     completed: 3,
///     task_count: 10,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct EvaluationCancelled {
    pub completed: usize,
    pub task_count: usize,
}

impl Display for EvaluationCancelled {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Evaluation cancelled after {} of {} tasks",
            self.completed, self.task_count
        )
    }
}

impl StructuredLog for EvaluationCancelled {
    fn log(&self) {
        tracing::warn!(
            completed = self.completed,
            task_count = self.task_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "evaluation_cancelled",
            span_name = name,
            completed = self.completed,
            task_count = self.task_count,
        )
    }
}
