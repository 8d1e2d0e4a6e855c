// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout};

use crate::errors::BackendError;
use crate::observability::messages::worker::{WorkerSpawned, WorkerTerminated};
use crate::observability::messages::StructuredLog;
use crate::worker::protocol::{decode_line, encode_line, TaskEnvelope, WorkerRequest, WorkerResponse};
use crate::worker::WorkerCommand;

/// One engine worker: runs tasks one at a time.
#[async_trait]
pub trait TaskWorker: Send {
    fn id(&self) -> usize;

    /// Run one task and return the worker's answer for it.
    async fn run(&mut self, envelope: &TaskEnvelope) -> Result<WorkerResponse, BackendError>;

    /// Stop after a successful evaluation. Errors if the worker did not exit cleanly.
    async fn shutdown(&mut self) -> Result<(), BackendError>;

    /// Stop immediately; outstanding work is discarded.
    async fn terminate(&mut self);
}

/// Starts the workers of one evaluation.
#[async_trait]
pub trait WorkerSpawner: Send + Sync {
    async fn spawn(&self, id: usize) -> Result<Box<dyn TaskWorker>, BackendError>;
}

/// Spawns worker processes from a [`WorkerCommand`].
#[derive(Debug, Clone)]
pub struct ProcessSpawner {
    command: WorkerCommand,
}

impl ProcessSpawner {
    pub fn new(command: WorkerCommand) -> Self {
        Self { command }
    }
}

#[async_trait]
impl WorkerSpawner for ProcessSpawner {
    async fn spawn(&self, id: usize) -> Result<Box<dyn TaskWorker>, BackendError> {
        let worker = WorkerProcess::spawn(id, &self.command)?;
        Ok(Box::new(worker))
    }
}

/// Worker process driven from the engine's runtime. Killed when dropped.
pub struct WorkerProcess {
    id: usize,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    tasks_completed: usize,
    finished: bool,
}

impl WorkerProcess {
    pub fn spawn(id: usize, command: &WorkerCommand) -> Result<Self, BackendError> {
        let program = command.display_program();
        let mut child = command
            .to_command()
            .spawn()
            .map_err(|source| BackendError::WorkerSpawn {
                program: program.clone(),
                source,
            })?;

        // kill_on_drop reaps the child if the streams are missing
        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                return Err(BackendError::WorkerLost {
                    worker: id,
                    reason: "standard streams were not captured".to_string(),
                })
            }
        };

        WorkerSpawned {
            worker: id,
            pid: child.id().unwrap_or_default(),
            program: &program,
        }
        .log();

        Ok(Self {
            id,
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            tasks_completed: 0,
            finished: false,
        })
    }

    fn lost(&mut self, reason: String) -> BackendError {
        let reason = match self.child.try_wait() {
            Ok(Some(status)) => format!("{} (exited with {})", reason, status),
            _ => reason,
        };
        BackendError::WorkerLost {
            worker: self.id,
            reason,
        }
    }

    fn terminated(&mut self, forced: bool) {
        self.finished = true;
        WorkerTerminated {
            worker: self.id,
            tasks_completed: self.tasks_completed,
            forced,
        }
        .log();
    }
}

#[async_trait]
impl TaskWorker for WorkerProcess {
    fn id(&self) -> usize {
        self.id
    }

    async fn run(&mut self, envelope: &TaskEnvelope) -> Result<WorkerResponse, BackendError> {
        let line = encode_line(&WorkerRequest::Call(envelope.clone())).map_err(|e| {
            BackendError::Transfer {
                subject: format!("computation {}", envelope.index),
                reason: e.to_string(),
            }
        })?;

        let id = self.id;
        let stdin = self.stdin.as_mut().ok_or_else(|| BackendError::WorkerLost {
            worker: id,
            reason: "worker input is already closed".to_string(),
        })?;
        let sent = match stdin.write_all(line.as_bytes()).await {
            Ok(()) => stdin.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = sent {
            return Err(self.lost(format!("failed to send request: {}", e)));
        }

        let mut response = String::new();
        let read = match self.stdout.read_line(&mut response).await {
            Ok(read) => read,
            Err(e) => return Err(self.lost(format!("failed to read response: {}", e))),
        };
        if read == 0 {
            return Err(self.lost("worker closed its output before answering".to_string()));
        }

        let response: WorkerResponse = match decode_line(&response) {
            Ok(response) => response,
            Err(e) => return Err(self.lost(format!("malformed response: {}", e))),
        };
        if response.index() != envelope.index {
            return Err(self.lost(format!(
                "answered computation {} while computation {} was outstanding",
                response.index(),
                envelope.index
            )));
        }

        self.tasks_completed += 1;
        Ok(response)
    }

    async fn shutdown(&mut self) -> Result<(), BackendError> {
        if self.finished {
            return Ok(());
        }
        if let Some(mut stdin) = self.stdin.take() {
            if let Ok(line) = encode_line(&WorkerRequest::Shutdown) {
                let _ = stdin.write_all(line.as_bytes()).await;
                let _ = stdin.flush().await;
            }
        }

        let status = self.child.wait().await.map_err(|e| BackendError::WorkerLost {
            worker: self.id,
            reason: format!("failed to wait for exit: {}", e),
        })?;
        self.terminated(false);

        if status.success() {
            Ok(())
        } else {
            Err(BackendError::WorkerLost {
                worker: self.id,
                reason: format!("exited with {}", status),
            })
        }
    }

    async fn terminate(&mut self) {
        if self.finished {
            return;
        }
        self.stdin.take();
        let _ = self.child.kill().await;
        self.terminated(true);
    }
}
