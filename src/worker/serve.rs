// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::io::{self, BufRead, Write};

use crate::observability::messages::worker::{TaskFailedInWorker, WorkerServing};
use crate::observability::messages::StructuredLog;
use crate::worker::protocol::{decode_line, encode_line, WorkerRequest, WorkerResponse};
use crate::worker::FunctionRegistry;

/// Serve protocol requests from `reader`, writing one response per call to `writer`.
///
/// Returns the number of tasks served once a `shutdown` request arrives or the
/// reader reaches end of input. A malformed request line is an `InvalidData`
/// error: the worker cannot know which computation it belonged to, so it stops
/// and the parent observes a lost worker.
pub fn serve<R: BufRead, W: Write>(
    registry: &FunctionRegistry,
    reader: R,
    mut writer: W,
) -> io::Result<usize> {
    let names = registry.names();
    WorkerServing { functions: &names }.log();

    let mut served = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let request: WorkerRequest = decode_line(&line)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let envelope = match request {
            WorkerRequest::Call(envelope) => envelope,
            WorkerRequest::Shutdown => break,
        };

        let function = envelope.function.clone();
        let response = registry.invoke(envelope);
        if let WorkerResponse::Failed { index, kind, message } = &response {
            TaskFailedInWorker {
                function: &function,
                index: *index,
                kind: kind.as_str(),
                message,
            }
            .log();
        }

        let encoded = encode_line(&response)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writer.write_all(encoded.as_bytes())?;
        writer.flush()?;
        served += 1;
    }

    Ok(served)
}

/// Serve the worker protocol on this process's stdin and stdout.
///
/// Call this from the worker executable's `main` after registering the work
/// functions it offers. Nothing else may write to stdout while it runs.
pub fn run_worker(registry: &FunctionRegistry) -> io::Result<usize> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(registry, stdin.lock(), stdout.lock())
}
