//! Error types for otsake

use thiserror::Error;

// Re-export PluginError from otsake-core
pub use otsake_core::PluginError;

/// Result type alias for enrichment operations
pub type Result<T> = std::result::Result<T, EnrichError>;

/// Errors raised by an [`ExpressionEvaluator`](crate::ExpressionEvaluator)
///
/// A query that matches nothing is not an error; evaluators report it as
/// `Ok(None)`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// Payload is not well-formed XML (or not UTF-8)
    #[error("payload is not valid XML: {0}")]
    Parse(String),

    /// Expression failed while executing against a parsed document
    #[error("evaluation of '{expression}' failed: {message}")]
    Execution { expression: String, message: String },
}

/// Main error type for the header enricher
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichError {
    /// Evaluator failure, propagated unmodified
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// Expression could not be compiled
    #[error("invalid XPath expression '{expression}': {message}")]
    InvalidExpression { expression: String, message: String },
}

impl From<EnrichError> for PluginError {
    fn from(err: EnrichError) -> Self {
        match err {
            EnrichError::Evaluation(e) => PluginError::Transform(e.to_string()),
            EnrichError::InvalidExpression { .. } => PluginError::Init(err.to_string()),
        }
    }
}
