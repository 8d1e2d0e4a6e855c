// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // execution strategies
pub mod builtins;   // work functions served by the bundled worker
pub mod config;     // configuration files
pub mod engine;     // worker scheduler and task graphs
pub mod errors;     // error handling
pub mod observability;
pub mod partition;  // frame groups and chunking
pub mod traits;     // backend and work-function contracts
pub mod worker;     // worker processes and wire protocol
