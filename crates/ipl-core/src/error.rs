use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced at the engine's boundary with the host.
///
/// The analysis passes themselves never fail; these cover save gating and configuration.
pub enum IplError {
    #[error("document has {errors} error diagnostic(s) and cannot be saved")]
    /// Validation reported at least one error-severity diagnostic.
    InvalidDocument {
        /// Number of error-severity diagnostics.
        errors: usize,
    },

    #[error("invalid lint configuration: {0}")]
    /// Lint configuration could not be parsed.
    Config(#[from] serde_json::Error),
}
