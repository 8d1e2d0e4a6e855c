// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for backend validation events.
//!
//! This module contains message types for logging events related to:
//! * Fatal validation rule violations
//! * Advisory validation rule violations

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A fatal rule failed; construction is aborted.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use analysis_backends::observability::messages::validation::ValidationFailed;
///
/// let msg = ValidationFailed {
///     backend: "process_pool",
///     message: "n_workers should be positive integer, got n_workers=0",
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ValidationFailed<'a> {
    pub backend: &'a str,
    pub message: &'a str,
}

impl Display for ValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Validation of {} backend failed: {}", self.backend, self.message)
    }
}

impl StructuredLog for ValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            backend = self.backend,
            reason = self.message,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::ERROR,
            "validation_failed",
            span_name = name,
            backend = self.backend,
        )
    }
}

/// An advisory rule failed; construction proceeds.
///
/// # Log Level
/// `warn!` - Potential issue that should be reviewed
///
/// # Example
/// ```
/// use analysis_backends::observability::messages::validation::ConfigurationWarningRaised;
///
/// let msg = ConfigurationWarningRaised {
///     backend: "serial",
///     message: "n_workers is ignored when executing with backend='serial'",
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct ConfigurationWarningRaised<'a> {
    pub backend: &'a str,
    pub message: &'a str,
}

impl Display for ConfigurationWarningRaised<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} backend: {}", self.backend, self.message)
    }
}

impl StructuredLog for ConfigurationWarningRaised<'_> {
    fn log(&self) {
        tracing::warn!(
            backend = self.backend,
            reason = self.message,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::span!(
            tracing::Level::WARN,
            "configuration_warning",
            span_name = name,
            backend = self.backend,
        )
    }
}
