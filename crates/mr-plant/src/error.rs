//! Error types for plant operations.

use mr_core::CoreError;
use thiserror::Error;

/// Errors raised by the reactor plant model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlantError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// The integrated state left the physical domain (power <= 0 or non-finite).
    #[error("Invalid plant state: {what} = {value}")]
    InvalidState { what: &'static str, value: f64 },
}

pub type PlantResult<T> = Result<T, PlantError>;

impl From<CoreError> for PlantError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { what, .. } | CoreError::InvalidArg { what } => {
                PlantError::InvalidArg { what }
            }
        }
    }
}
