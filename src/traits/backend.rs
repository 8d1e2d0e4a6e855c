use crate::backends::validation::ValidationRules;
use crate::errors::{BackendError, ConfigurationWarning};
use crate::traits::WorkFunction;

/// Per-backend construction rules.
///
/// `rules` is evaluated once, while the backend is being constructed and before
/// the instance is handed to the caller. Strategies extend the base rules
/// rather than replacing them.
pub trait ValidationPolicy {
    /// Short strategy name used in errors and log events
    const NAME: &'static str;

    /// Worker count exactly as the caller requested it, before validation
    fn requested_workers(&self) -> i64;

    fn rules(&self) -> ValidationRules {
        ValidationRules::base(self.requested_workers())
    }
}

/// The contract every execution strategy satisfies.
///
/// `apply` must return exactly what `computations.iter().map(|c| function.call(c))`
/// would, in the same order, or the first failure. Strategies choose how and
/// where each call runs.
pub trait ExecutionBackend {
    /// Short strategy name used in errors and log events
    fn name(&self) -> &'static str;

    /// Validated worker count
    fn n_workers(&self) -> usize;

    /// Advisory diagnostics raised during construction
    fn warnings(&self) -> &[ConfigurationWarning];

    /// Map `function` over `computations`, preserving input order.
    ///
    /// Blocks until every item has been processed or the first failure occurs.
    fn apply<F: WorkFunction>(
        &self,
        function: &F,
        computations: &[F::Input],
    ) -> Result<Vec<F::Output>, BackendError>;
}
