// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::instrumented;
use crate::backends::validation::{validate, ValidationRules};
use crate::errors::{BackendError, ConfigurationWarning};
use crate::observability::messages::backend::BackendConstructed;
use crate::observability::messages::StructuredLog;
use crate::traits::work_function::call_caught;
use crate::traits::{ExecutionBackend, ValidationPolicy, WorkFunction};

/// Reference backend: applies the function on the calling thread, in input order.
///
/// Nothing is serialized and no process is started, which makes this backend
/// the ground truth the parallel backends are compared against and the
/// fallback where processes cannot be spawned. The worker count is accepted
/// for interface compatibility but ignored; requesting more than one worker
/// raises a configuration warning.
///
/// # Example
/// ```
/// use analysis_backends::backends::SerialBackend;
/// use analysis_backends::builtins::Square;
/// use analysis_backends::traits::ExecutionBackend;
///
/// let backend = SerialBackend::new(1).unwrap();
/// let results = backend.apply(&Square, &[1, 2, 3, 4, 5]).unwrap();
/// assert_eq!(results, vec![1, 4, 9, 16, 25]);
/// ```
#[derive(Debug)]
pub struct SerialBackend {
    n_workers: i64,
    warnings: Vec<ConfigurationWarning>,
}

impl SerialBackend {
    pub fn new(n_workers: i64) -> Result<Self, BackendError> {
        let mut backend = Self {
            n_workers,
            warnings: Vec::new(),
        };
        backend.warnings = validate(&backend)?;

        BackendConstructed {
            backend: Self::NAME,
            n_workers: backend.n_workers(),
            warning_count: backend.warnings.len(),
        }
        .log();
        Ok(backend)
    }
}

impl ValidationPolicy for SerialBackend {
    const NAME: &'static str = "serial";

    fn requested_workers(&self) -> i64 {
        self.n_workers
    }

    fn rules(&self) -> ValidationRules {
        ValidationRules::base(self.n_workers).warn_unless(
            self.n_workers <= 1,
            "n_workers is ignored when executing with backend='serial'",
        )
    }
}

impl ExecutionBackend for SerialBackend {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn n_workers(&self) -> usize {
        // Validated positive at construction
        self.n_workers as usize
    }

    fn warnings(&self) -> &[ConfigurationWarning] {
        &self.warnings
    }

    fn apply<F: WorkFunction>(
        &self,
        function: &F,
        computations: &[F::Input],
    ) -> Result<Vec<F::Output>, BackendError> {
        instrumented(Self::NAME, F::NAME, computations.len(), self.n_workers(), || {
            computations
                .iter()
                .enumerate()
                .map(|(index, computation)| {
                    call_caught(function, computation)
                        .map_err(|message| BackendError::WorkerExecution { index, message })
                })
                .collect()
        })
    }
}
