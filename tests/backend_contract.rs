// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observable contract shared by every backend, exercised against real worker
//! processes running the bundled `analysis-backends worker` executable.

use analysis_backends::backends::{
    Backend, BackendFactory, BackendKind, ProcessPoolBackend, SerialBackend, TaskGraphBackend,
};
use analysis_backends::builtins::{FailOn, Scale, Square, SumOfSquares};
use analysis_backends::errors::BackendError;
use analysis_backends::partition::computation_groups;
use analysis_backends::traits::{ExecutionBackend, WorkFunction};
use analysis_backends::worker::WorkerCommand;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

fn worker_command() -> WorkerCommand {
    WorkerCommand::new(env!("CARGO_BIN_EXE_analysis-backends")).arg("worker")
}

fn all_backends(n_workers: i64) -> Vec<Backend> {
    let mut backends: Vec<Backend> = vec![
        SerialBackend::new(n_workers).unwrap().into(),
        ProcessPoolBackend::new(n_workers)
            .unwrap()
            .with_worker_command(worker_command())
            .into(),
    ];
    #[cfg(feature = "task-graph")]
    backends.push(
        TaskGraphBackend::new(n_workers)
            .unwrap()
            .with_worker_command(worker_command())
            .into(),
    );
    backends
}

/// Known to the caller but not to the bundled worker.
#[derive(Serialize, Deserialize)]
struct Unregistered;

impl WorkFunction for Unregistered {
    const NAME: &'static str = "unregistered";
    type Input = i64;
    type Output = i64;

    fn call(&self, input: &i64) -> anyhow::Result<i64> {
        Ok(*input)
    }
}

/// A resource that cannot leave the calling process.
struct OpenHandle;

impl Serialize for OpenHandle {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(serde::ser::Error::custom("open handles cannot leave this process"))
    }
}

impl<'de> Deserialize<'de> for OpenHandle {
    fn deserialize<D: Deserializer<'de>>(_deserializer: D) -> Result<Self, D::Error> {
        Err(serde::de::Error::custom("open handles cannot leave this process"))
    }
}

#[derive(Serialize, Deserialize)]
struct CloseHandle;

impl WorkFunction for CloseHandle {
    const NAME: &'static str = "close_handle";
    type Input = OpenHandle;
    type Output = bool;

    fn call(&self, _input: &OpenHandle) -> anyhow::Result<bool> {
        Ok(true)
    }
}

#[test]
fn test_square_preserves_order_on_every_backend() {
    for backend in all_backends(2) {
        let results = backend.apply(&Square, &[1, 2, 3, 4, 5]).unwrap();

        assert_eq!(results, vec![1, 4, 9, 16, 25], "backend {}", backend.name());
    }
}

#[test]
fn test_backends_agree_with_serial() {
    let items: Vec<f64> = (0..40).map(|i| i as f64 * 0.75 - 3.0).collect();
    let function = Scale { factor: -1.5 };
    let expected = SerialBackend::new(1).unwrap().apply(&function, &items).unwrap();

    for backend in all_backends(3) {
        let results = backend.apply(&function, &items).unwrap();
        assert_eq!(results, expected, "backend {}", backend.name());
    }
}

#[test]
fn test_non_finite_floats_match_serial() {
    let items = [1.0, f64::MAX, f64::NAN, f64::NEG_INFINITY, -0.0];
    let function = Scale { factor: 2.0 };
    let expected = SerialBackend::new(1).unwrap().apply(&function, &items).unwrap();
    assert_eq!(expected[1], f64::INFINITY);
    assert!(expected[2].is_nan());

    for backend in all_backends(2) {
        let results = backend.apply(&function, &items).unwrap();
        let bits: Vec<u64> = results.iter().map(|value| value.to_bits()).collect();
        let expected_bits: Vec<u64> = expected.iter().map(|value| value.to_bits()).collect();
        assert_eq!(bits, expected_bits, "backend {}", backend.name());
    }
}

#[test]
fn test_frame_groups_sum_to_serial_total() {
    let groups: Vec<_> = computation_groups(1000, 4)
        .into_iter()
        .map(|group| group.start as u64..group.end as u64)
        .collect();
    let expected: u64 = (0..1000u64).map(|i| i * i).sum();

    for backend in all_backends(4) {
        let sums = backend.apply(&SumOfSquares, &groups).unwrap();
        assert_eq!(sums.len(), 4);
        assert_eq!(sums.iter().sum::<u64>(), expected, "backend {}", backend.name());
    }
}

#[test]
fn test_non_positive_workers_rejected_by_every_kind() {
    for kind in [BackendKind::Serial, BackendKind::ProcessPool, BackendKind::TaskGraph] {
        for n_workers in [0, -1] {
            match BackendFactory::create(kind, n_workers) {
                Err(BackendError::Configuration { message, .. }) => assert_eq!(
                    message,
                    format!("n_workers should be positive integer, got n_workers={}", n_workers)
                ),
                other => panic!("{}: expected configuration error, got {:?}", kind, other),
            }
        }
    }
}

#[test]
fn test_single_worker_pool_runs() {
    let backend = ProcessPoolBackend::new(1)
        .unwrap()
        .with_worker_command(worker_command());

    assert_eq!(backend.apply(&Square, &[3, 4]).unwrap(), vec![9, 16]);
}

#[test]
fn test_serial_warns_that_workers_are_ignored() {
    let backend = SerialBackend::new(4).unwrap();

    assert_eq!(backend.warnings().len(), 1);
    assert!(backend.warnings()[0].message.contains("n_workers is ignored"));
    assert_eq!(backend.apply(&Square, &[2]).unwrap(), vec![4]);
}

#[test]
fn test_missing_engine_detected_at_construction() {
    let error = TaskGraphBackend::with_engine_probe(2, || false).unwrap_err();

    match error {
        BackendError::DependencyMissing { capability, .. } => {
            assert_eq!(capability, "task-graph engine")
        }
        other => panic!("expected dependency error, got {:?}", other),
    }
}

#[test]
fn test_failing_item_fails_the_whole_call() {
    for backend in all_backends(2) {
        let error = backend
            .apply(&FailOn { value: 3 }, &[1, 2, 3, 4, 5])
            .unwrap_err();

        match error {
            BackendError::WorkerExecution { index, message } => {
                assert_eq!(index, 2, "backend {}", backend.name());
                assert!(message.contains("invalid value 3"));
            }
            other => panic!("{}: expected worker execution error, got {:?}", backend.name(), other),
        }
    }
}

#[test]
fn test_repeated_apply_is_idempotent() {
    let items: Vec<i64> = (-10..10).collect();

    for backend in all_backends(2) {
        let first = backend.apply(&Square, &items).unwrap();
        let second = backend.apply(&Square, &items).unwrap();
        assert_eq!(first, second, "backend {}", backend.name());
    }
}

#[test]
fn test_untransferable_item_spawns_no_worker() {
    // Spawning this would fail with WorkerSpawn instead
    let missing = WorkerCommand::new("/nonexistent/analysis-worker");

    let pool = ProcessPoolBackend::new(2)
        .unwrap()
        .with_worker_command(missing.clone());
    assert!(matches!(
        pool.apply(&CloseHandle, &[OpenHandle]),
        Err(BackendError::Transfer { .. })
    ));

    #[cfg(feature = "task-graph")]
    {
        let graph = TaskGraphBackend::new(2).unwrap().with_worker_command(missing);
        assert!(matches!(
            graph.apply(&CloseHandle, &[OpenHandle]),
            Err(BackendError::Transfer { .. })
        ));
    }
}

#[test]
fn test_unregistered_function_is_transfer_error() {
    for backend in all_backends(2) {
        if backend.kind() == BackendKind::Serial {
            continue;
        }

        match backend.apply(&Unregistered, &[1, 2, 3]) {
            Err(BackendError::Transfer { reason, .. }) => {
                assert!(reason.contains("not registered"), "backend {}", backend.name())
            }
            other => panic!("{}: expected transfer error, got {:?}", backend.name(), other),
        }
    }
}

#[test]
fn test_pool_chunk_sizes_do_not_change_results() {
    let items: Vec<i64> = (0..23).collect();
    let expected: Vec<i64> = items.iter().map(|i| i * i).collect();

    for chunksize in [1, 3, 50] {
        let backend = ProcessPoolBackend::new(3)
            .unwrap()
            .with_chunksize(chunksize)
            .with_worker_command(worker_command());

        assert_eq!(backend.apply(&Square, &items).unwrap(), expected);
    }
}

#[test]
fn test_empty_computations_on_every_backend() {
    for backend in all_backends(2) {
        assert!(backend.apply(&Square, &[]).unwrap().is_empty());
    }
}

#[test]
fn test_worker_that_exits_is_reported_lost() {
    // Without the worker subcommand the binary prints usage and exits
    let broken = WorkerCommand::new(env!("CARGO_BIN_EXE_analysis-backends")).arg("bogus");

    let pool = ProcessPoolBackend::new(2).unwrap().with_worker_command(broken.clone());
    assert!(matches!(
        pool.apply(&Square, &[1, 2, 3]),
        Err(BackendError::WorkerLost { .. })
    ));

    #[cfg(feature = "task-graph")]
    {
        let graph = TaskGraphBackend::new(2).unwrap().with_worker_command(broken);
        assert!(matches!(
            graph.apply(&Square, &[1, 2, 3]),
            Err(BackendError::WorkerLost { .. })
        ));
    }
}
