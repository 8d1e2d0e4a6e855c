// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Message types live in [`messages`] and follow a struct-based pattern with a
//! `Display` implementation plus [`messages::StructuredLog`] to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep field names consistent between events of the same subsystem
//! * Provide consistent, structured logging output
//!
//! [`init_logging`] installs the process-wide `tracing` subscriber. Output
//! always goes to stderr: worker processes use stdout for the wire protocol.
//!
//! # Usage
//!
//! ```rust
//! use analysis_backends::observability::messages::backend::ApplyFailed;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
//! let msg = ApplyFailed {
//!     backend: "serial",
//!     function: "square",
//!     error: &error,
//! };
//!
//! tracing::error!("{}", msg);
//! ```

pub mod messages;

use crate::config::LoggingConfig;
use crate::errors::ConfigError;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// The level comes from `RUST_LOG` when set, otherwise from `config.level`.
/// When `config.file` is set, every event is also appended to that file.
///
/// Fails if the filter is invalid, the log file cannot be opened, or a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    let writer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
            BoxMakeWriter::new(std::io::stderr.and(Mutex::new(file)))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(config.file.is_none())
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))
}
