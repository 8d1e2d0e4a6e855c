// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::process::Stdio;

use serde::Deserialize;
use tokio::process::Command;

use crate::config::consts::WORKER_SUBCOMMAND;
use crate::errors::BackendError;

/// How to launch a worker process.
///
/// The executable must serve the worker protocol on its standard streams, see
/// [`run_worker`](crate::worker::run_worker).
///
/// # Example
/// ```yaml
/// worker:
///   program: /opt/analysis/bin/rmsd-driver
///   args: ["worker"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorkerCommand {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The running executable re-invoked with the worker subcommand.
    pub fn current_exe() -> Result<Self, BackendError> {
        let program = std::env::current_exe().map_err(|source| BackendError::WorkerSpawn {
            program: "<current executable>".to_string(),
            source,
        })?;
        Ok(Self::new(program).arg(WORKER_SUBCOMMAND))
    }

    /// Use `explicit` when given, otherwise the current executable.
    pub fn resolve(explicit: Option<&WorkerCommand>) -> Result<Self, BackendError> {
        match explicit {
            Some(command) => Ok(command.clone()),
            None => Self::current_exe(),
        }
    }

    pub fn display_program(&self) -> String {
        self.program.display().to_string()
    }

    /// Command with piped stdin/stdout; stderr is inherited so worker logs
    /// stay visible. The child is killed when its handle is dropped.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_appends_args() {
        let command = WorkerCommand::new("/bin/worker").arg("worker").arg("--quiet");

        assert_eq!(command.program, PathBuf::from("/bin/worker"));
        assert_eq!(command.args, vec!["worker", "--quiet"]);
        assert_eq!(command.display_program(), "/bin/worker");
    }

    #[test]
    fn test_resolve_prefers_explicit_command() {
        let explicit = WorkerCommand::new("/bin/worker");

        assert_eq!(WorkerCommand::resolve(Some(&explicit)).unwrap(), explicit);
    }

    #[test]
    fn test_resolve_defaults_to_current_exe() {
        let command = WorkerCommand::resolve(None).unwrap();

        assert_eq!(command.program, std::env::current_exe().unwrap());
        assert_eq!(command.args, vec![WORKER_SUBCOMMAND]);
    }

    #[test]
    fn test_deserialize_without_args() {
        let command: WorkerCommand = serde_yaml::from_str("program: /bin/worker\n").unwrap();

        assert!(command.args.is_empty());
    }
}
