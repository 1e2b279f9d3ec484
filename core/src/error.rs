//! Error types for otsake pipeline components

use thiserror::Error;

/// Error type for pipeline components
///
/// Middleware and other components report failures through this type so a
/// chain can propagate them without knowing the component's own error enum.
///
/// # Example
///
/// ```
/// use otsake_core::PluginError;
///
/// let err = PluginError::Transform("payload is not XML".to_string());
/// assert_eq!(err.to_string(), "transform failed: payload is not XML");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PluginError {
    /// Initialization failed
    ///
    /// Examples: invalid configuration, malformed expression.
    #[error("initialization failed: {0}")]
    Init(String),

    /// Transform failed
    ///
    /// Returned when a component fails to transform a message.
    /// Examples: payload is not XML, expression failed to execute.
    #[error("transform failed: {0}")]
    Transform(String),
}
