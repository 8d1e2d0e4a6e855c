/// Argument that switches the binary into worker mode
pub const WORKER_SUBCOMMAND: &str = "worker";
/// Log level when neither the configuration nor `RUST_LOG` sets one
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Log level of worker processes; their stderr is shared with the driver
pub const WORKER_LOG_LEVEL: &str = "warn";
/// Worker count for parallel backends when the machine cannot report its parallelism
pub const FALLBACK_WORKERS: usize = 4;
