//! Error types for the plotting core.

use thiserror::Error;

/// The main error type for range, mapper and renderer operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlotError {
    /// A value outside the mapper's valid domain (e.g. log of a non-positive number).
    #[error("domain error: {0}")]
    Domain(String),
    /// The operation is not allowed on this object in its current form.
    #[error("runtime error: {0}")]
    Runtime(String),
    /// The source type does not support the requested operation.
    #[error("not implemented: {0}")]
    NotImplemented(String),
    /// Invalid configuration or parameters, reported at call time.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Two arrays that must share a shape do not.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    Shape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    /// A named array was requested that the plot data does not hold.
    #[error("no data named '{0}'")]
    MissingData(String),
}

/// Result type alias for plotting operations.
pub type PlotResult<T> = Result<T, PlotError>;
