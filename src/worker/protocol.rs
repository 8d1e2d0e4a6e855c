// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Wire protocol between a backend and its worker processes.
//!
//! One JSON document per line in each direction. The parent writes a
//! [`WorkerRequest`] to the worker's stdin and reads exactly one
//! [`WorkerResponse`] from its stdout per `call` request.
//!
//! Function state, inputs and outputs travel as [`Payload`]s: MessagePack bytes
//! in base64 text. MessagePack keeps every `f64` bit for bit, NaN and the
//! infinities included, and accepts maps with non-string keys.
//!
//! ```text
//! -> {"type":"call","index":2,"function":"square","state":"wA==","input":"Aw=="}
//! <- {"type":"completed","index":2,"output":"CQ=="}
//! -> {"type":"shutdown"}
//! ```

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::BackendError;
use crate::traits::WorkFunction;

/// One serialized value: function state, a computation or a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn encode<T: Serialize>(value: &T) -> Result<Self, rmp_serde::encode::Error> {
        rmp_serde::to_vec_named(value).map(Payload)
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, rmp_serde::decode::Error> {
        rmp_serde::from_slice(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD
            .decode(text.as_bytes())
            .map(Payload)
            .map_err(serde::de::Error::custom)
    }
}

/// A fully serialized unit of work: function identifier, function state and one input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEnvelope {
    /// Position of the computation in the caller's list
    pub index: usize,
    pub function: String,
    pub state: Payload,
    pub input: Payload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerRequest {
    Call(TaskEnvelope),
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The function or its input could not be reconstructed in the worker
    Transfer,
    /// The function itself returned an error or panicked
    Execution,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transfer => "transfer",
            FailureKind::Execution => "execution",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerResponse {
    Completed {
        index: usize,
        output: Payload,
    },
    Failed {
        index: usize,
        kind: FailureKind,
        message: String,
    },
}

impl WorkerResponse {
    pub fn index(&self) -> usize {
        match self {
            WorkerResponse::Completed { index, .. } | WorkerResponse::Failed { index, .. } => {
                *index
            }
        }
    }

    /// Convert into the output payload, mapping worker-side failures onto `BackendError`.
    pub fn into_output(self) -> Result<(usize, Payload), BackendError> {
        match self {
            WorkerResponse::Completed { index, output } => Ok((index, output)),
            WorkerResponse::Failed {
                index,
                kind: FailureKind::Transfer,
                message,
            } => Err(BackendError::Transfer {
                subject: format!("computation {}", index),
                reason: message,
            }),
            WorkerResponse::Failed {
                index,
                kind: FailureKind::Execution,
                message,
            } => Err(BackendError::WorkerExecution { index, message }),
        }
    }
}

/// Serialize one protocol message as a single line, newline included.
pub fn encode_line<T: Serialize>(message: &T) -> serde_json::Result<String> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

pub fn decode_line<T: DeserializeOwned>(line: &str) -> serde_json::Result<T> {
    serde_json::from_str(line.trim_end())
}

/// Serialize a work function and every computation into task envelopes.
///
/// Runs entirely in the calling process, before any worker exists, so a
/// non-serializable function or item fails the call without spawning anything.
pub fn encode_tasks<F: WorkFunction>(
    function: &F,
    computations: &[F::Input],
) -> Result<Vec<TaskEnvelope>, BackendError> {
    let state = Payload::encode(function).map_err(|e| BackendError::Transfer {
        subject: format!("work function '{}'", F::NAME),
        reason: e.to_string(),
    })?;

    computations
        .iter()
        .enumerate()
        .map(|(index, computation)| {
            let input = Payload::encode(computation).map_err(|e| BackendError::Transfer {
                subject: format!("computation {}", index),
                reason: e.to_string(),
            })?;
            Ok(TaskEnvelope {
                index,
                function: F::NAME.to_string(),
                state: state.clone(),
                input,
            })
        })
        .collect()
}

/// Deserialize outputs that are already in input order.
pub fn decode_outputs<F: WorkFunction>(outputs: Vec<Payload>) -> Result<Vec<F::Output>, BackendError> {
    outputs
        .into_iter()
        .enumerate()
        .map(|(index, output)| {
            output.decode().map_err(|e| BackendError::Transfer {
                subject: format!("result of computation {}", index),
                reason: e.to_string(),
            })
        })
        .collect()
}
