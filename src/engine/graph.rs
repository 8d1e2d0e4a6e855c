// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::BackendError;
use crate::observability::messages::engine::TaskGraphBuilt;
use crate::observability::messages::StructuredLog;
use crate::traits::WorkFunction;
use crate::worker::protocol::{encode_tasks, Payload, TaskEnvelope};

/// A call that has been described but not run: `function(state)(input)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredTask {
    key: String,
    envelope: TaskEnvelope,
}

impl DeferredTask {
    /// Unique key in its graph, `<function>-<index>`
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Position of the computation in the caller's list
    pub fn index(&self) -> usize {
        self.envelope.index
    }

    pub fn envelope(&self) -> &TaskEnvelope {
        &self.envelope
    }
}

/// Describe one call of a work function on an already serialized input.
pub fn delayed(function: &str, state: Payload, index: usize, input: Payload) -> DeferredTask {
    DeferredTask {
        key: format!("{}-{}", function, index),
        envelope: TaskEnvelope {
            index,
            function: function.to_string(),
            state,
            input,
        },
    }
}

/// A set of independent deferred tasks for one work function.
///
/// There are no edges: every task can run as soon as a worker is free. Task
/// positions in the graph equal the computation indices.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskGraph {
    function: String,
    tasks: Vec<DeferredTask>,
}

impl TaskGraph {
    /// Build one deferred task per computation.
    ///
    /// Serialization happens here, so a function or item that cannot cross the
    /// process boundary fails before the engine starts.
    pub fn from_computations<F: WorkFunction>(
        function: &F,
        computations: &[F::Input],
    ) -> Result<Self, BackendError> {
        let tasks = encode_tasks(function, computations)?
            .into_iter()
            .map(|envelope| delayed(F::NAME, envelope.state, envelope.index, envelope.input))
            .collect();
        let graph = Self {
            function: F::NAME.to_string(),
            tasks,
        };

        TaskGraphBuilt {
            function: &graph.function,
            task_count: graph.len(),
        }
        .log();
        Ok(graph)
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn tasks(&self) -> &[DeferredTask] {
        &self.tasks
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(DeferredTask::key)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// The tasks' envelopes in computation order, ready for [`evaluate`](crate::engine::evaluate).
    pub fn into_envelopes(self) -> Vec<TaskEnvelope> {
        self.tasks.into_iter().map(|task| task.envelope).collect()
    }
}
