// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process workers for scheduler tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::engine::worker::{TaskWorker, WorkerSpawner};
use crate::errors::BackendError;
use crate::worker::protocol::{TaskEnvelope, WorkerResponse};
use crate::worker::FunctionRegistry;

/// Runs tasks through a registry on the runtime, after a per-task delay.
pub(crate) struct InProcessSpawner {
    pub registry: Arc<FunctionRegistry>,
    pub delay: fn(&TaskEnvelope) -> Duration,
    /// Tasks run so far, across every worker
    pub runs: Arc<AtomicUsize>,
    /// Workers started so far
    pub spawned: Arc<AtomicUsize>,
    pub fail_spawn: bool,
}

impl InProcessSpawner {
    pub fn new(registry: FunctionRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            delay: |_| Duration::ZERO,
            runs: Arc::new(AtomicUsize::new(0)),
            spawned: Arc::new(AtomicUsize::new(0)),
            fail_spawn: false,
        }
    }
}

struct InProcessWorker {
    id: usize,
    registry: Arc<FunctionRegistry>,
    delay: fn(&TaskEnvelope) -> Duration,
    runs: Arc<AtomicUsize>,
}

#[async_trait]
impl WorkerSpawner for InProcessSpawner {
    async fn spawn(&self, id: usize) -> Result<Box<dyn TaskWorker>, BackendError> {
        if self.fail_spawn {
            return Err(BackendError::WorkerSpawn {
                program: "in-process".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such worker"),
            });
        }
        self.spawned.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(InProcessWorker {
            id,
            registry: self.registry.clone(),
            delay: self.delay,
            runs: self.runs.clone(),
        }))
    }
}

#[async_trait]
impl TaskWorker for InProcessWorker {
    fn id(&self) -> usize {
        self.id
    }

    async fn run(&mut self, envelope: &TaskEnvelope) -> Result<WorkerResponse, BackendError> {
        tokio::time::sleep((self.delay)(envelope)).await;
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(self.registry.invoke(envelope.clone()))
    }

    async fn shutdown(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    async fn terminate(&mut self) {}
}
