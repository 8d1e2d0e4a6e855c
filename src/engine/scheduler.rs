// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dynamic scheduler for independent tasks.
//!
//! # Execution Flow
//!
//! 1. **Units**: the tasks are cut into dispatch units of `chunksize`
//!    consecutive tasks and queued in order.
//! 2. **Workers**: one async driver per worker spawns its worker, then pulls the
//!    next unit from the shared queue whenever it is idle.
//! 3. **Fail-fast**: the first failure is recorded where it happens and cancels
//!    the shared token. Drivers stop dispatching, idle workers are terminated,
//!    and the recorded failure is returned.
//! 4. **Collection**: outputs are placed by task index.
//!
//! Every driver runs on the evaluation's own runtime, so nothing the
//! evaluation started survives it.

use std::collections::VecDeque;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::engine::worker::{TaskWorker, WorkerSpawner};
use crate::errors::BackendError;
use crate::observability::messages::engine::{EvaluationCancelled, EvaluationStarted};
use crate::observability::messages::StructuredLog;
use crate::partition::chunk_ranges;
use crate::worker::protocol::{Payload, TaskEnvelope};

/// Scheduler settings for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluateOptions {
    /// Upper bound on concurrently running workers
    pub n_workers: usize,
    /// Tasks per dispatch unit
    pub chunksize: usize,
    /// Start all `n_workers` workers even when there are fewer dispatch units
    pub fixed_pool: bool,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            n_workers: 1,
            chunksize: 1,
            fixed_pool: false,
        }
    }
}

/// State shared by the drivers of one evaluation.
struct Shared {
    tasks: Vec<TaskEnvelope>,
    queue: Mutex<VecDeque<Range<usize>>>,
    cancellation_token: CancellationToken,
    first_error: OnceLock<BackendError>,
    completed: AtomicUsize,
}

impl Shared {
    /// Keep `error` if nothing failed before it, and stop every driver.
    fn fail(&self, error: BackendError) {
        if self.first_error.set(error).is_ok() {
            self.cancellation_token.cancel();
            EvaluationCancelled {
                completed: self.completed.load(Ordering::Relaxed),
                task_count: self.tasks.len(),
            }
            .log();
        }
    }
}

/// Evaluate `tasks` on a runtime owned by this call and block until it finishes.
///
/// Returns one output per task, in task order. Must not be called from inside
/// an async runtime; use [`evaluate_async`] there.
pub fn evaluate(
    tasks: Vec<TaskEnvelope>,
    spawner: Arc<dyn WorkerSpawner>,
    options: EvaluateOptions,
) -> Result<Vec<Payload>, BackendError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(BackendError::Engine {
            message: "cannot block on worker tasks from inside an async runtime".to_string(),
        });
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(options.n_workers.clamp(1, 8))
        .thread_name("analysis-scheduler")
        .enable_all()
        .build()
        .map_err(|e| BackendError::Engine {
            message: format!("failed to start runtime: {}", e),
        })?;

    runtime.block_on(evaluate_async(tasks, spawner, options))
}

/// Evaluate `tasks` on the current runtime.
pub async fn evaluate_async(
    tasks: Vec<TaskEnvelope>,
    spawner: Arc<dyn WorkerSpawner>,
    options: EvaluateOptions,
) -> Result<Vec<Payload>, BackendError> {
    let task_count = tasks.len();
    if task_count == 0 {
        return Ok(Vec::new());
    }

    let units: VecDeque<Range<usize>> = chunk_ranges(task_count, options.chunksize).into();
    let n_workers = if options.fixed_pool {
        options.n_workers.max(1)
    } else {
        options.n_workers.max(1).min(units.len())
    };

    let started = EvaluationStarted {
        task_count,
        unit_count: units.len(),
        n_workers,
    };
    let span = started.span("evaluate");
    started.log();

    let shared = Arc::new(Shared {
        tasks,
        queue: Mutex::new(units),
        cancellation_token: CancellationToken::new(),
        first_error: OnceLock::new(),
        completed: AtomicUsize::new(0),
    });

    let mut drivers = JoinSet::new();
    for id in 0..n_workers {
        drivers.spawn(drive_worker(id, spawner.clone(), shared.clone()).instrument(span.clone()));
    }

    let mut results: Vec<Option<Payload>> = vec![None; task_count];
    while let Some(joined) = drivers.join_next().await {
        match joined {
            Ok(outputs) => {
                for (index, output) in outputs {
                    results[index] = Some(output);
                }
            }
            Err(e) => shared.fail(BackendError::Engine {
                message: format!("worker driver failed: {}", e),
            }),
        }
    }

    if shared.cancellation_token.is_cancelled() {
        // Every driver has finished, so this is the last reference
        let recorded = Arc::into_inner(shared).and_then(|shared| shared.first_error.into_inner());
        return Err(recorded.unwrap_or_else(|| BackendError::Engine {
            message: "evaluation was cancelled without a recorded failure".to_string(),
        }));
    }

    results
        .into_iter()
        .enumerate()
        .map(|(index, output)| {
            output.ok_or_else(|| BackendError::Engine {
                message: format!("task {} produced no result", index),
            })
        })
        .collect()
}

async fn drive_worker(
    id: usize,
    spawner: Arc<dyn WorkerSpawner>,
    shared: Arc<Shared>,
) -> Vec<(usize, Payload)> {
    let spawned = tokio::select! {
        _ = shared.cancellation_token.cancelled() => return Vec::new(),
        spawned = spawner.spawn(id) => spawned,
    };
    let mut worker = match spawned {
        Ok(worker) => worker,
        Err(error) => {
            shared.fail(error);
            return Vec::new();
        }
    };

    let mut outputs = Vec::new();
    match run_units(worker.as_mut(), &shared, &mut outputs).await {
        Ok(()) if !shared.cancellation_token.is_cancelled() => {
            if let Err(error) = worker.shutdown().await {
                shared.fail(error);
            }
        }
        Ok(()) => worker.terminate().await,
        Err(error) => {
            shared.fail(error);
            worker.terminate().await;
        }
    }
    outputs
}

async fn run_units(
    worker: &mut dyn TaskWorker,
    shared: &Shared,
    outputs: &mut Vec<(usize, Payload)>,
) -> Result<(), BackendError> {
    let cancellation_token = &shared.cancellation_token;
    loop {
        if cancellation_token.is_cancelled() {
            return Ok(());
        }
        let next = shared.queue.lock().await.pop_front();
        let Some(unit) = next else {
            return Ok(());
        };

        for task in &shared.tasks[unit] {
            let response = tokio::select! {
                _ = cancellation_token.cancelled() => return Ok(()),
                response = worker.run(task) => response?,
            };
            outputs.push(response.into_output()?);
            shared.completed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::{self, FailOn, Square};
    use crate::engine::testing::InProcessSpawner;
    use crate::traits::WorkFunction;
    use crate::worker::protocol::encode_tasks;
    use crate::worker::FunctionRegistry;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    /// Rejects every input.
    #[derive(Serialize, Deserialize)]
    struct Reject;

    impl WorkFunction for Reject {
        const NAME: &'static str = "reject";
        type Input = i64;
        type Output = i64;

        fn call(&self, input: &i64) -> anyhow::Result<i64> {
            anyhow::bail!("rejected {}", input)
        }
    }

    fn options(n_workers: usize) -> EvaluateOptions {
        EvaluateOptions {
            n_workers,
            ..EvaluateOptions::default()
        }
    }

    fn input_of(envelope: &TaskEnvelope) -> u64 {
        envelope.input.decode::<i64>().unwrap_or(0) as u64
    }

    fn decoded(outputs: Vec<Payload>) -> Vec<i64> {
        outputs.iter().map(|output| output.decode().unwrap()).collect()
    }

    #[tokio::test]
    async fn test_results_follow_task_order() {
        let spawner = InProcessSpawner::new(builtins::registry());
        let tasks = encode_tasks(&Square, &[1, 2, 3, 4, 5]).unwrap();

        let outputs = evaluate_async(tasks, Arc::new(spawner), options(3)).await.unwrap();
        assert_eq!(decoded(outputs), vec![1, 4, 9, 16, 25]);
    }

    #[tokio::test]
    async fn test_order_kept_when_later_tasks_finish_first() {
        let mut spawner = InProcessSpawner::new(builtins::registry());
        // Early tasks sleep longest
        spawner.delay = |envelope| Duration::from_millis((8 - input_of(envelope).min(8)) * 15);
        let items: Vec<i64> = (0..8).collect();
        let tasks = encode_tasks(&Square, &items).unwrap();

        let outputs = evaluate_async(tasks, Arc::new(spawner), options(4)).await.unwrap();
        let expected: Vec<i64> = items.iter().map(|i| i * i).collect();
        assert_eq!(decoded(outputs), expected);
    }

    #[tokio::test]
    async fn test_failure_cancels_remaining_tasks() {
        let spawner = InProcessSpawner::new(builtins::registry());
        let runs = spawner.runs.clone();
        let tasks = encode_tasks(&FailOn { value: 3 }, &[1, 2, 3, 4, 5]).unwrap();

        let error = evaluate_async(tasks, Arc::new(spawner), options(1)).await.unwrap_err();
        match error {
            BackendError::WorkerExecution { index, message } => {
                assert_eq!(index, 2);
                assert_eq!(message, "invalid value 3");
            }
            other => panic!("expected worker execution error, got {:?}", other),
        }
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_earliest_failure_is_reported() {
        let mut spawner = InProcessSpawner::new(FunctionRegistry::new().register::<Reject>());
        // The first task fails last
        spawner.delay = |envelope| {
            if input_of(envelope) == 0 {
                Duration::from_millis(300)
            } else {
                Duration::ZERO
            }
        };
        let tasks = encode_tasks(&Reject, &[0, 1]).unwrap();

        let error = evaluate_async(tasks, Arc::new(spawner), options(2)).await.unwrap_err();
        match error {
            BackendError::WorkerExecution { index, message } => {
                assert_eq!(index, 1);
                assert_eq!(message, "rejected 1");
            }
            other => panic!("expected worker execution error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unregistered_function_is_transfer_error() {
        let spawner = InProcessSpawner::new(FunctionRegistry::new().register::<Square>());
        let tasks = encode_tasks(&FailOn { value: 0 }, &[1, 2]).unwrap();

        let error = evaluate_async(tasks, Arc::new(spawner), options(2)).await.unwrap_err();
        assert!(matches!(error, BackendError::Transfer { .. }));
    }

    #[tokio::test]
    async fn test_spawn_failure_propagates() {
        let mut spawner = InProcessSpawner::new(builtins::registry());
        spawner.fail_spawn = true;
        let tasks = encode_tasks(&Square, &[1, 2, 3]).unwrap();

        let error = evaluate_async(tasks, Arc::new(spawner), options(2)).await.unwrap_err();
        assert!(matches!(error, BackendError::WorkerSpawn { .. }));
    }

    #[tokio::test]
    async fn test_larger_units_cover_every_task() {
        let spawner = InProcessSpawner::new(builtins::registry());
        let items: Vec<i64> = (0..10).collect();
        let tasks = encode_tasks(&Square, &items).unwrap();
        let options = EvaluateOptions {
            n_workers: 3,
            chunksize: 4,
            fixed_pool: false,
        };

        let outputs = decoded(evaluate_async(tasks, Arc::new(spawner), options).await.unwrap());
        assert_eq!(outputs.len(), 10);
        assert_eq!(outputs[9], 81);
    }

    #[tokio::test]
    async fn test_worker_count_follows_pool_mode() {
        for (fixed_pool, expected) in [(false, 2), (true, 4)] {
            let spawner = InProcessSpawner::new(builtins::registry());
            let spawned = spawner.spawned.clone();
            let tasks = encode_tasks(&Square, &[1, 2]).unwrap();
            let options = EvaluateOptions {
                n_workers: 4,
                chunksize: 1,
                fixed_pool,
            };

            evaluate_async(tasks, Arc::new(spawner), options).await.unwrap();
            assert_eq!(spawned.load(Ordering::SeqCst), expected);
        }
    }

    #[tokio::test]
    async fn test_blocking_evaluate_refuses_inside_runtime() {
        let spawner = InProcessSpawner::new(builtins::registry());
        let tasks = encode_tasks(&Square, &[1]).unwrap();

        let error = evaluate(tasks, Arc::new(spawner), options(1)).unwrap_err();
        assert!(matches!(error, BackendError::Engine { .. }));
    }

    #[test]
    fn test_blocking_evaluate_owns_its_runtime() {
        let spawner = InProcessSpawner::new(builtins::registry());
        let tasks = encode_tasks(&Square, &[6, 7]).unwrap();

        let outputs = evaluate(tasks, Arc::new(spawner), options(2)).unwrap();
        assert_eq!(decoded(outputs), vec![36, 49]);
    }

    #[test]
    fn test_empty_task_list_needs_no_workers() {
        let mut spawner = InProcessSpawner::new(builtins::registry());
        spawner.fail_spawn = true;

        assert!(evaluate(Vec::new(), Arc::new(spawner), options(4)).unwrap().is_empty());
    }
}
