// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::BackendError;
use thiserror::Error;

/// Errors raised while loading configuration files or setting up logging
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unknown backend '{0}', expected one of: serial, process_pool (multiprocessing), task_graph (dask)")]
    UnknownBackend(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
