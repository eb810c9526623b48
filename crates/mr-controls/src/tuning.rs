//! Reference drum banks and gain schedules.
//!
//! Gains are tuned once in reactivity units (Δk/k per second per unit power
//! error) and divided by the bank's differential worth at its critical angle,
//! so every drum count sees the same loop gain in reactivity terms. The slew
//! limit is scaled the same way: every bank can insert at most
//! [`REACTIVITY_SLEW_PER_S`].

use crate::actuator::{DrumBank, DrumLimits};
use crate::controller::{ControllerConfig, ControllerKind};
use crate::error::{ControlError, ControlResult};
use crate::pid::PidGains;
use crate::stc::StcGains;
use crate::worth::WorthCurve;

/// Full-stroke worth of one drum (Δk/k).
pub const DRUM_WORTH: f64 = 4.0e-3;

/// Full-stroke worth of the enlarged drum of the single-drum core (Δk/k).
pub const SINGLE_DRUM_WORTH: f64 = 6.0e-3;

/// Maximum reactivity insertion rate of any bank (Δk/k per second).
pub const REACTIVITY_SLEW_PER_S: f64 = 1.36e-4;

/// Power response per unit reactivity on the prompt-jump plateau (pu per Δk/k).
pub const PROMPT_POWER_GAIN: f64 = 300.0;

const PID_KP_RHO: f64 = 1.5e-3;
const PID_KI_RHO: f64 = 1.0e-4;
const PID_KD_RHO: f64 = 1.0e-4;
const PID_FILTER_S: f64 = 0.2;
// Normalised super-twisting gains for a unit-gain plant.
const STC_K1: f64 = 0.067;
const STC_K2: f64 = 5.0e-4;
/// Sliding surface `s = e + c * de/dt` weight (seconds).
const STC_SURFACE_DERIVATIVE_S: f64 = 1.0;
const STC_FILTER_S: f64 = 0.5;

/// Critical angle (deg) of the reference core with `count` drums installed.
///
/// Fewer drums leave the critical angle further out so the bank keeps room to
/// insert negative reactivity for deep load reductions.
pub fn critical_angle_deg(count: usize) -> ControlResult<f64> {
    match count {
        8 => Ok(77.56),
        4 => Ok(90.0),
        2 => Ok(120.0),
        1 => Ok(125.0),
        other => Err(ControlError::InvalidConfig {
            what: format!("no reference bank for {other} drums"),
        }),
    }
}

/// Full-stroke worth (Δk/k) of each drum in the reference `count`-drum core.
pub fn drum_worth(count: usize) -> f64 {
    if count == 1 {
        SINGLE_DRUM_WORTH
    } else {
        DRUM_WORTH
    }
}

/// Reference bank for `count` drums.
pub fn preset_bank(count: usize) -> ControlResult<DrumBank> {
    let curve = WorthCurve::Sinusoidal {
        drum_worth: drum_worth(count),
        critical_angle_deg: critical_angle_deg(count)?,
    };
    let differential = count as f64 * curve.differential(curve.critical_angle_deg());
    let limits = DrumLimits {
        rate_max_deg_s: REACTIVITY_SLEW_PER_S / differential,
        ..DrumLimits::default()
    };
    DrumBank::new(count, curve, limits)
}

impl PidGains {
    /// Reference gains converted to deg/s with the bank's differential worth.
    pub fn for_bank(bank: &DrumBank) -> Self {
        let worth = bank.nominal_differential_worth();
        Self {
            kp: PID_KP_RHO / worth,
            ki: PID_KI_RHO / worth,
            kd: PID_KD_RHO / worth,
            derivative_filter_s: PID_FILTER_S,
            kaw: 0.0,
        }
    }
}

impl StcGains {
    /// Normalised gains divided by the input gain `b = G_prompt * dρ/dθ`.
    pub fn for_bank(bank: &DrumBank) -> Self {
        let b = PROMPT_POWER_GAIN * bank.nominal_differential_worth();
        Self {
            k1: STC_K1 / b,
            k2: STC_K2 / b,
            surface_derivative_s: STC_SURFACE_DERIVATIVE_S,
            derivative_filter_s: STC_FILTER_S,
        }
    }
}

/// Reference gains for `kind`, scaled to `bank`.
pub fn preset_controller(kind: ControllerKind, bank: &DrumBank) -> ControllerConfig {
    match kind {
        ControllerKind::Pid => ControllerConfig::Pid(PidGains::for_bank(bank)),
        ControllerKind::SuperTwisting => ControllerConfig::SuperTwisting(StcGains::for_bank(bank)),
    }
}
