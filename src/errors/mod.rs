// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod backend;
mod config;

pub use backend::{BackendError, ConfigurationWarning};
pub use config::ConfigError;
