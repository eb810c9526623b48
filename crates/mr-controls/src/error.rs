//! Error types for drum and controller construction.

use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors raised while building actuators or controllers.
///
/// Runtime saturation is never an error; only invalid parameters are.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Unsupported structural configuration.
    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: String },
}
