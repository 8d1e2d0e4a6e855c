// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker scheduling shared by the parallel backends.
//!
//! [`evaluate`] runs a list of task envelopes on a dedicated `tokio` runtime,
//! handing dispatch units of `chunksize` tasks to workers started by a
//! [`WorkerSpawner`] as they become idle. The process pool runs it with its
//! own chunk size and a fixed set of workers.
//!
//! With the `task-graph` feature, a [`TaskGraph`] holds one [`DeferredTask`]
//! per computation, with no edges between them; the task-graph backend
//! evaluates its envelopes one task per dispatch unit.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use analysis_backends::builtins::Square;
//! use analysis_backends::engine::{evaluate, EvaluateOptions, ProcessSpawner, TaskGraph};
//! use analysis_backends::worker::WorkerCommand;
//!
//! let graph = TaskGraph::from_computations(&Square, &[1, 2, 3])?;
//! let spawner = Arc::new(ProcessSpawner::new(WorkerCommand::current_exe()?));
//! let options = EvaluateOptions { n_workers: 2, ..EvaluateOptions::default() };
//! let outputs = evaluate(graph.into_envelopes(), spawner, options)?;
//! assert_eq!(outputs.len(), 3);
//! # Ok::<(), analysis_backends::errors::BackendError>(())
//! ```

#[cfg(feature = "task-graph")]
mod graph;
mod scheduler;
#[cfg(test)]
pub(crate) mod testing;
mod worker;

#[cfg(feature = "task-graph")]
pub use graph::{delayed, DeferredTask, TaskGraph};
pub use scheduler::{evaluate, evaluate_async, EvaluateOptions};
pub use worker::{ProcessSpawner, TaskWorker, WorkerProcess, WorkerSpawner};
