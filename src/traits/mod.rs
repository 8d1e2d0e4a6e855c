pub mod backend;
pub mod work_function;

pub use backend::{ExecutionBackend, ValidationPolicy};
pub use work_function::WorkFunction;
