// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Worker processes for the parallel backends.
//!
//! A worker is any executable that serves the line-delimited JSON protocol in
//! [`protocol`] on its standard streams. The usual setup is for the driver
//! binary to double as its own worker:
//!
//! ```rust,no_run
//! use analysis_backends::builtins::Square;
//! use analysis_backends::worker::{run_worker, FunctionRegistry};
//!
//! fn main() -> std::io::Result<()> {
//!     if std::env::args().nth(1).as_deref() == Some("worker") {
//!         let registry = FunctionRegistry::new().register::<Square>();
//!         run_worker(&registry)?;
//!         return Ok(());
//!     }
//!     // ... driver code constructing a backend and calling `apply`
//!     Ok(())
//! }
//! ```

mod command;
pub mod protocol;
mod registry;
mod serve;

pub use command::WorkerCommand;
pub use registry::FunctionRegistry;
pub use serve::{run_worker, serve};
