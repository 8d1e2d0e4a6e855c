// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::traits::work_function::{call_caught, panicked};
use crate::traits::WorkFunction;
use crate::worker::protocol::{FailureKind, Payload, TaskEnvelope, WorkerResponse};

type Handler = Box<dyn Fn(&Payload, &Payload) -> Result<Payload, (FailureKind, String)> + Send + Sync>;

/// Registry of the work functions a worker process can execute.
///
/// Functions are resolved by [`WorkFunction::NAME`]. The handler stored for each
/// name rebuilds the function from its serialized state, decodes the input,
/// calls the function and encodes the output.
pub struct FunctionRegistry {
    handlers: HashMap<&'static str, Handler>,
}

impl FunctionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a work function type. Registering the same name twice replaces the handler.
    pub fn register<F: WorkFunction + 'static>(mut self) -> Self {
        let handler: Handler = Box::new(|state: &Payload, input: &Payload| {
            let function: F = state.decode().map_err(|e| {
                (
                    FailureKind::Transfer,
                    format!("cannot decode state of work function '{}': {}", F::NAME, e),
                )
            })?;
            let input: F::Input = input.decode().map_err(|e| {
                (
                    FailureKind::Transfer,
                    format!("cannot decode input for work function '{}': {}", F::NAME, e),
                )
            })?;
            let output = call_caught(&function, &input).map_err(|e| (FailureKind::Execution, e))?;
            Payload::encode(&output).map_err(|e| {
                (
                    FailureKind::Transfer,
                    format!("cannot encode output of work function '{}': {}", F::NAME, e),
                )
            })
        });
        self.handlers.insert(F::NAME, handler);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered function names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Run one task and describe the outcome as a protocol response.
    ///
    /// Never panics: a panicking work function is reported as an execution failure.
    pub fn invoke(&self, envelope: TaskEnvelope) -> WorkerResponse {
        let TaskEnvelope {
            index,
            function,
            state,
            input,
        } = envelope;

        let Some(handler) = self.handlers.get(function.as_str()) else {
            return WorkerResponse::Failed {
                index,
                kind: FailureKind::Transfer,
                message: format!("work function '{}' is not registered in this worker", function),
            };
        };

        // Decoding runs user serde impls, which may panic too
        match catch_unwind(AssertUnwindSafe(|| handler(&state, &input))) {
            Ok(Ok(output)) => WorkerResponse::Completed { index, output },
            Ok(Err((kind, message))) => WorkerResponse::Failed {
                index,
                kind,
                message,
            },
            Err(panic) => WorkerResponse::Failed {
                index,
                kind: FailureKind::Execution,
                message: panicked(&function, &*panic),
            },
        }
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}
