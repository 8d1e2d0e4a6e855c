// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_LOG_LEVEL, FALLBACK_WORKERS};
use crate::errors::{BackendError, ConfigError};
use crate::worker::WorkerCommand;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration for one analysis run's execution backend.
///
/// # Fields
/// * `backend` - Which execution strategy to use
/// * `n_workers` - Requested worker count (optional, see [`BackendKind::default_workers`])
/// * `chunksize` - Computations per dispatched chunk, process pool only (optional)
/// * `worker` - Worker executable for the parallel backends (optional, defaults to this binary)
/// * `logging` - Log level and optional log file
///
/// # Example
/// ```yaml
/// backend: process_pool
/// n_workers: 4
/// chunksize: 2
/// worker:
///   program: /opt/analysis/bin/rmsd-driver
///   args: ["worker"]
/// logging:
///   level: debug
///   file: analysis.log
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub backend: BackendKind,
    #[serde(default)]
    pub n_workers: Option<WorkerCountSetting>,
    #[serde(default)]
    pub chunksize: Option<usize>,
    #[serde(default)]
    pub worker: Option<WorkerCommand>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            n_workers: None,
            chunksize: None,
            worker: None,
            logging: LoggingConfig::default(),
        }
    }

    /// The worker count to construct the backend with.
    ///
    /// Fails with a configuration error when the file gave a value that is not
    /// an integer; range checks are left to the backend's own validation.
    pub fn requested_workers(&self) -> Result<i64, BackendError> {
        match &self.n_workers {
            Some(setting) => setting.resolve(self.backend),
            None => Ok(self.backend.default_workers()),
        }
    }
}

/// Execution strategy selector.
///
/// The names `multiprocessing` and `dask` are accepted for the process pool and
/// the task graph respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Serial,
    #[serde(alias = "multiprocessing")]
    ProcessPool,
    #[serde(alias = "dask")]
    TaskGraph,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Serial => "serial",
            BackendKind::ProcessPool => "process_pool",
            BackendKind::TaskGraph => "task_graph",
        }
    }

    /// Worker count used when the configuration does not set one: one for the
    /// serial backend, the available parallelism for the others.
    pub fn default_workers(&self) -> i64 {
        match self {
            BackendKind::Serial => 1,
            BackendKind::ProcessPool | BackendKind::TaskGraph => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(FALLBACK_WORKERS) as i64,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serial" => Ok(BackendKind::Serial),
            "process_pool" | "multiprocessing" => Ok(BackendKind::ProcessPool),
            "task_graph" | "dask" => Ok(BackendKind::TaskGraph),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

/// `n_workers` exactly as written in a configuration file.
///
/// Anything that is not an integer is kept so the error can show it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WorkerCountSetting {
    Integer(i64),
    Invalid(serde_json::Value),
}

impl WorkerCountSetting {
    pub fn resolve(&self, backend: BackendKind) -> Result<i64, BackendError> {
        match self {
            WorkerCountSetting::Integer(n_workers) => Ok(*n_workers),
            WorkerCountSetting::Invalid(value) => Err(BackendError::Configuration {
                backend: backend.as_str(),
                message: format!("n_workers should be positive integer, got n_workers={}", value),
            }),
        }
    }
}

/// Logging configuration.
///
/// # Example
/// ```yaml
/// logging:
///   level: "info,analysis_backends::engine=debug"
///   file: run.log
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Also append every event to this file
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            file: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::with_level(DEFAULT_LOG_LEVEL)
    }
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

/// Load a config from a YAML file, or a TOML file when the extension is `.toml`
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    let cfg: Config = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(cfg)
}
