//! Error types for simulation setup.

use mr_controls::ControlError;
use mr_plant::PlantError;
use thiserror::Error;

/// Errors raised before or while building a simulation.
///
/// A plant failure during the time loop is not an error of `run`; it is
/// reported in [`crate::RunOutcome::failure`] alongside the partial trace.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Plant error: {0}")]
    Plant(#[from] PlantError),

    #[error("Control error: {0}")]
    Control(#[from] ControlError),
}

pub type SimResult<T> = Result<T, SimError>;
