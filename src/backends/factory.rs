// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::{Backend, ProcessPoolBackend, SerialBackend, TaskGraphBackend};
use crate::config::{BackendKind, Config, WorkerCountSetting};
use crate::errors::BackendError;

/// Factory for creating validated backends by kind or from configuration
pub struct BackendFactory;

impl BackendFactory {
    /// Create a backend of `kind` with default settings.
    pub fn create(kind: BackendKind, n_workers: i64) -> Result<Backend, BackendError> {
        Self::from_config(&Config {
            n_workers: Some(WorkerCountSetting::Integer(n_workers)),
            ..Config::new(kind)
        })
    }

    /// Create the backend a configuration file describes.
    pub fn from_config(cfg: &Config) -> Result<Backend, BackendError> {
        let n_workers = cfg.requested_workers()?;

        let backend = match cfg.backend {
            BackendKind::Serial => SerialBackend::new(n_workers)?.into(),
            BackendKind::ProcessPool => {
                let mut backend = ProcessPoolBackend::new(n_workers)?;
                if let Some(chunksize) = cfg.chunksize {
                    backend = backend.with_chunksize(chunksize);
                }
                if let Some(command) = &cfg.worker {
                    backend = backend.with_worker_command(command.clone());
                }
                backend.into()
            }
            BackendKind::TaskGraph => {
                let mut backend = TaskGraphBackend::new(n_workers)?;
                if let Some(command) = &cfg.worker {
                    backend = backend.with_worker_command(command.clone());
                }
                backend.into()
            }
        };
        Ok(backend)
    }
}
