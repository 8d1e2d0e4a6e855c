use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A pure function applied independently to each computation item.
///
/// The implementing value is the function's closed-over state: it is serialized
/// and shipped to worker processes alongside every item, so it must round-trip
/// through serde. `NAME` is the identifier a worker's
/// [`FunctionRegistry`](crate::worker::FunctionRegistry) resolves the function
/// by, and must be unique within a registry.
///
/// Implementations must not rely on state shared between invocations; each call
/// may run in a different process.
///
/// # Example
/// ```
/// use analysis_backends::traits::WorkFunction;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Offset {
///     by: i64,
/// }
///
/// impl WorkFunction for Offset {
///     const NAME: &'static str = "offset";
///     type Input = i64;
///     type Output = i64;
///
///     fn call(&self, input: &i64) -> anyhow::Result<i64> {
///         Ok(input + self.by)
///     }
/// }
///
/// assert_eq!(Offset { by: 2 }.call(&40).unwrap(), 42);
/// ```
pub trait WorkFunction: Serialize + DeserializeOwned + Send + Sync {
    const NAME: &'static str;

    type Input: Serialize + DeserializeOwned + Send + Sync;
    type Output: Serialize + DeserializeOwned + Send;

    fn call(&self, input: &Self::Input) -> anyhow::Result<Self::Output>;
}

/// Call `function`, reporting an error or a panic as the failure message.
///
/// Shared by the serial backend and the worker registry so a failure reads the
/// same wherever the function ran.
pub(crate) fn call_caught<F: WorkFunction>(
    function: &F,
    input: &F::Input,
) -> Result<F::Output, String> {
    match catch_unwind(AssertUnwindSafe(|| function.call(input))) {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(format!("{:#}", e)),
        Err(panic) => Err(panicked(F::NAME, &*panic)),
    }
}

pub(crate) fn panicked(function: &str, panic: &(dyn Any + Send)) -> String {
    let message = if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };
    format!("work function '{}' panicked: {}", function, message)
}
