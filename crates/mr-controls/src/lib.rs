//! Drum actuation and reactivity controllers.
//!
//! # Architecture
//!
//! - A [`DrumBank`] turns a rate command (deg/s) into a drum angle and a
//!   reactivity contribution, enforcing slew-rate and travel limits.
//! - Controllers implement the [`Controller`] trait: given the observed power
//!   and the demanded power, produce a drum rate command and update internal
//!   memory. [`PidController`] and [`SuperTwistingController`] are the two
//!   implementations; [`AnyController`] is the tagged union the driver holds.
//! - Gains are supplied in reactivity units and converted to deg/s units with
//!   the bank's differential worth, so one tuning serves every drum count.

pub mod actuator;
pub mod controller;
pub mod error;
pub mod pid;
pub mod stc;
pub mod tuning;
pub mod worth;

pub use actuator::{ActuatorStep, DrumBank, DrumLimits, DrumState, SUPPORTED_DRUM_COUNTS};
pub use controller::{
    AnyController, ControlAction, Controller, ControllerConfig, ControllerKind,
    ControllerSnapshot, Observation,
};
pub use error::{ControlError, ControlResult};
pub use pid::{PidController, PidGains, PidState};
pub use stc::{StcGains, StcState, SuperTwistingController};
pub use tuning::{
    DRUM_WORTH, PROMPT_POWER_GAIN, REACTIVITY_SLEW_PER_S, SINGLE_DRUM_WORTH, critical_angle_deg,
    drum_worth, preset_bank, preset_controller,
};
pub use worth::WorthCurve;
