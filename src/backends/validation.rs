// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Construction-time validation for execution backends.
//!
//! Every backend describes itself as a [`ValidationRules`] set: an ordered list
//! of fatal checks and an ordered list of advisory warnings, each pairing a
//! condition that must hold with the message reported when it does not.
//! [`validate`] evaluates the set once, while the backend is being built:
//!
//! 1. **Checks**: the first violated check aborts construction with the
//!    matching [`BackendError`]. Base checks come first.
//! 2. **Warnings**: every violated warning is logged and returned, and
//!    construction proceeds.
//!
//! Warnings are only evaluated once all checks pass.

use crate::errors::{BackendError, ConfigurationWarning};
use crate::observability::messages::validation::{ConfigurationWarningRaised, ValidationFailed};
use crate::observability::messages::StructuredLog;
use crate::traits::ValidationPolicy;

/// What a violated fatal check turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    Configuration(String),
    DependencyMissing { capability: String, guidance: String },
}

impl Violation {
    fn into_error(self, backend: &'static str) -> BackendError {
        match self {
            Violation::Configuration(message) => BackendError::Configuration { backend, message },
            Violation::DependencyMissing {
                capability,
                guidance,
            } => BackendError::DependencyMissing {
                backend,
                capability,
                guidance,
            },
        }
    }

    fn message(&self) -> String {
        match self {
            Violation::Configuration(message) => message.clone(),
            Violation::DependencyMissing {
                capability,
                guidance,
            } => format!("{} is not available: {}", capability, guidance),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    pub holds: bool,
    pub violation: Violation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub holds: bool,
    pub message: String,
}

/// Ordered `condition -> message` rules for one backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationRules {
    checks: Vec<Check>,
    warnings: Vec<Warning>,
}

impl ValidationRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules shared by every backend: the worker count must be positive.
    pub fn base(n_workers: i64) -> Self {
        Self::new().check(
            n_workers > 0,
            format!(
                "n_workers should be positive integer, got n_workers={}",
                n_workers
            ),
        )
    }

    /// Add a fatal check that raises a configuration error when `holds` is false.
    pub fn check(mut self, holds: bool, message: impl Into<String>) -> Self {
        self.checks.push(Check {
            holds,
            violation: Violation::Configuration(message.into()),
        });
        self
    }

    /// Add a fatal check for an optional capability.
    pub fn require(
        mut self,
        available: bool,
        capability: impl Into<String>,
        guidance: impl Into<String>,
    ) -> Self {
        self.checks.push(Check {
            holds: available,
            violation: Violation::DependencyMissing {
                capability: capability.into(),
                guidance: guidance.into(),
            },
        });
        self
    }

    /// Add an advisory rule that warns when `holds` is false.
    pub fn warn_unless(mut self, holds: bool, message: impl Into<String>) -> Self {
        self.warnings.push(Warning {
            holds,
            message: message.into(),
        });
        self
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Evaluate the rules on behalf of `backend`.
    pub fn evaluate(self, backend: &'static str) -> Result<Vec<ConfigurationWarning>, BackendError> {
        if let Some(check) = self.checks.into_iter().find(|check| !check.holds) {
            let message = check.violation.message();
            ValidationFailed {
                backend,
                message: &message,
            }
            .log();
            return Err(check.violation.into_error(backend));
        }

        Ok(self
            .warnings
            .into_iter()
            .filter(|warning| !warning.holds)
            .map(|warning| {
                ConfigurationWarningRaised {
                    backend,
                    message: &warning.message,
                }
                .log();
                ConfigurationWarning {
                    backend,
                    message: warning.message,
                }
            })
            .collect())
    }
}

/// Validate a backend that has been assembled but not yet handed out.
pub fn validate<B: ValidationPolicy>(backend: &B) -> Result<Vec<ConfigurationWarning>, BackendError> {
    backend.rules().evaluate(B::NAME)
}
