//! Control-drum bank actuator.
//!
//! All drums in a bank rotate together. The actuator integrates a rate command
//! (deg/s) with explicit Euler, enforcing:
//! - **Slew-rate limit**: `|rate| <= rate_max_deg_s`
//! - **Travel limits**: angle stays within `[angle_min_deg, angle_max_deg]`
//!
//! Saturation is reported through flags on [`ActuatorStep`]; it never fails.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use crate::worth::WorthCurve;

/// Drum counts the bank supports.
pub const SUPPORTED_DRUM_COUNTS: [usize; 4] = [1, 2, 4, 8];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrumLimits {
    pub angle_min_deg: f64,
    pub angle_max_deg: f64,
    /// Maximum slew rate magnitude (deg/s), must be positive
    pub rate_max_deg_s: f64,
}

impl Default for DrumLimits {
    fn default() -> Self {
        Self {
            angle_min_deg: 0.0,
            angle_max_deg: 180.0,
            rate_max_deg_s: 0.5,
        }
    }
}

impl DrumLimits {
    pub fn validate(&self) -> ControlResult<()> {
        if !(self.angle_min_deg.is_finite() && self.angle_max_deg.is_finite()) {
            return Err(ControlError::InvalidArg {
                what: "angle limits must be finite",
            });
        }
        if self.angle_min_deg >= self.angle_max_deg {
            return Err(ControlError::InvalidArg {
                what: "angle_min_deg must be less than angle_max_deg",
            });
        }
        if !(self.rate_max_deg_s.is_finite() && self.rate_max_deg_s > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "rate_max_deg_s must be positive",
            });
        }
        Ok(())
    }
}

/// Common angle and last applied rate of the bank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrumState {
    pub angle_deg: f64,
    pub rate_deg_s: f64,
}

/// Result of one actuator step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorStep {
    /// New state; `rate_deg_s` is the rate actually realised over the step.
    pub state: DrumState,
    /// Total bank reactivity at the new angle.
    pub reactivity: f64,
    pub rate_saturated: bool,
    pub angle_saturated: bool,
}

/// `count` identical drums sharing one worth curve and one set of limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrumBank {
    count: usize,
    curve: WorthCurve,
    limits: DrumLimits,
}

impl DrumBank {
    /// Create a bank.
    ///
    /// # Errors
    ///
    /// Returns error if `count` is not one of [`SUPPORTED_DRUM_COUNTS`], or if
    /// the curve or limits are invalid.
    pub fn new(count: usize, curve: WorthCurve, limits: DrumLimits) -> ControlResult<Self> {
        if !SUPPORTED_DRUM_COUNTS.contains(&count) {
            return Err(ControlError::InvalidConfig {
                what: format!("unsupported drum count {count} (expected 1, 2, 4 or 8)"),
            });
        }
        curve.validate()?;
        limits.validate()?;
        let critical = curve.critical_angle_deg();
        if critical < limits.angle_min_deg || critical > limits.angle_max_deg {
            return Err(ControlError::InvalidArg {
                what: "critical angle must lie within the angle limits",
            });
        }
        Ok(Self {
            count,
            curve,
            limits,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn curve(&self) -> &WorthCurve {
        &self.curve
    }

    pub fn limits(&self) -> &DrumLimits {
        &self.limits
    }

    pub fn rate_limit(&self) -> f64 {
        self.limits.rate_max_deg_s
    }

    /// Total reactivity of the bank at `angle_deg`.
    pub fn reactivity(&self, angle_deg: f64) -> f64 {
        self.count as f64 * self.curve.reactivity(angle_deg)
    }

    /// Total differential worth of the bank (Δk/k per degree).
    pub fn differential_worth(&self, angle_deg: f64) -> f64 {
        self.count as f64 * self.curve.differential(angle_deg)
    }

    /// Differential worth at the critical angle, used to scale gains.
    pub fn nominal_differential_worth(&self) -> f64 {
        self.differential_worth(self.curve.critical_angle_deg())
    }

    /// At rest, inserting `rho` of total reactivity (clamped by travel limits).
    pub fn state_for_reactivity(&self, rho: f64) -> DrumState {
        let per_drum = rho / self.count as f64;
        DrumState {
            angle_deg: self.curve.angle_for(
                per_drum,
                self.limits.angle_min_deg,
                self.limits.angle_max_deg,
            ),
            rate_deg_s: 0.0,
        }
    }

    /// Advance the bank by `dt` under `rate_command`.
    ///
    /// A non-finite command is treated as zero.
    pub fn step(&self, state: &DrumState, rate_command: f64, dt: f64) -> ActuatorStep {
        let limit = self.limits.rate_max_deg_s;
        let command = if rate_command.is_finite() {
            rate_command
        } else {
            0.0
        };
        let rate = command.clamp(-limit, limit);
        let raw_angle = state.angle_deg + rate * dt;
        let angle = raw_angle.clamp(self.limits.angle_min_deg, self.limits.angle_max_deg);

        let realised = if dt > 0.0 {
            (angle - state.angle_deg) / dt
        } else {
            0.0
        };

        ActuatorStep {
            state: DrumState {
                angle_deg: angle,
                rate_deg_s: realised,
            },
            reactivity: self.reactivity(angle),
            rate_saturated: command.abs() > limit,
            angle_saturated: raw_angle != angle,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn step_respects_limits(
            angle in 0.0_f64..180.0,
            command in -50.0_f64..50.0,
            dt in 1e-4_f64..0.1,
            count_idx in 0usize..4,
        ) {
            let b = DrumBank::new(
                SUPPORTED_DRUM_COUNTS[count_idx],
                WorthCurve::Sinusoidal { drum_worth: 4.0e-3, critical_angle_deg: 90.0 },
                DrumLimits::default(),
            ).unwrap();
            let s = DrumState { angle_deg: angle, rate_deg_s: 0.0 };
            let out = b.step(&s, command, dt);
            prop_assert!(out.state.angle_deg >= 0.0 && out.state.angle_deg <= 180.0);
            prop_assert!((out.state.angle_deg - angle).abs() <= 0.5 * dt + 1e-12);
            prop_assert!(out.state.rate_deg_s.abs() <= 0.5 + 1e-9);
        }
    }
}
