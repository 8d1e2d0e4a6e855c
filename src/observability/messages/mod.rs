// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit the same event with typed fields at its proper
//! level.
//!
//! # Organization
//!
//! * `backend` - backend construction and `apply` lifecycle events
//! * `validation` - construction-time rule violations
//! * `worker` - worker process lifecycle events
//! * `engine` - task-graph construction and evaluation events
//!
//! # Usage Pattern
//!
//! ```rust
//! use analysis_backends::observability::messages::backend::ApplyStarted;
//! use analysis_backends::observability::messages::StructuredLog;
//!
//! let msg = ApplyStarted {
//!     backend: "process_pool",
//!     function: "square",
//!     computation_count: 5,
//!     n_workers: 4,
//! };
//!
//! msg.log();
//! ```

use std::fmt::Display;
use tracing::Span;

pub mod backend;
pub mod engine;
pub mod validation;
pub mod worker;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the message as a `tracing` event
    fn log(&self);

    /// Build a span carrying the message's fields
    fn span(&self, name: &str) -> Span;
}
