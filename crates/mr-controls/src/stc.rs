//! Super-twisting sliding-mode drum-rate controller.
//!
//! Sliding variable `s = (power - demand) + c * d/dt(power - demand)`. The
//! command is
//!
//! ```text
//! rate = -k1 * |s|^(1/2) * sign(s) + u1
//! du1/dt = -k2 * sign(s)
//! ```
//!
//! `u1` is advanced with explicit Euler after the command is formed, so the
//! command at step n uses `u1(t_n)`. Both `u1` and the output are held within
//! the bank's slew limit.

use mr_core::{sign, signed_sqrt};
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StcGains {
    /// (deg/s) per sqrt(unit power)
    pub k1: f64,
    /// (deg/s^2)
    pub k2: f64,
    /// Weight `c` (seconds) of the error derivative in the sliding variable
    #[serde(default)]
    pub surface_derivative_s: f64,
    /// Filter time constant (seconds) for the error derivative
    pub derivative_filter_s: f64,
}

impl StcGains {
    pub fn validate(&self) -> ControlResult<()> {
        for (value, what) in [
            (self.k1, "k1 must be finite and non-negative"),
            (self.k2, "k2 must be finite and non-negative"),
            (
                self.surface_derivative_s,
                "surface_derivative_s must be finite and non-negative",
            ),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ControlError::InvalidArg { what });
            }
        }
        if !(self.derivative_filter_s.is_finite() && self.derivative_filter_s >= 0.0) {
            return Err(ControlError::InvalidArg {
                what: "derivative_filter_s must be non-negative",
            });
        }
        Ok(())
    }

    /// One sampled update on the tracking error `power - demand`.
    ///
    /// # Returns
    ///
    /// Updated state, the unclamped command and the clamped command.
    pub fn update(
        &self,
        state: &StcState,
        error: f64,
        dt: f64,
        rate_limit: f64,
    ) -> (StcState, f64, f64) {
        let (filtered_error, derivative) = match state.filtered_error {
            Some(prev) => {
                let alpha = self.derivative_filter_s / (self.derivative_filter_s + dt);
                let filt = alpha * prev + (1.0 - alpha) * error;
                (filt, (filt - prev) / dt)
            }
            None => (error, 0.0),
        };
        let sliding = error + self.surface_derivative_s * derivative;

        let raw = -self.k1 * signed_sqrt(sliding) + state.u1;
        let output = raw.clamp(-rate_limit, rate_limit);

        let u1 = (state.u1 - self.k2 * sign(sliding) * dt).clamp(-rate_limit, rate_limit);

        let new_state = StcState {
            sliding,
            u1,
            filtered_error: Some(filtered_error),
        };
        (new_state, raw, output)
    }
}

/// Super-twisting memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StcState {
    /// Sliding variable at the last update.
    pub sliding: f64,
    /// Integral (twisting) component of the command (deg/s).
    pub u1: f64,
    pub filtered_error: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuperTwistingController {
    gains: StcGains,
    rate_limit: f64,
    state: StcState,
}

impl SuperTwistingController {
    pub fn new(gains: StcGains, rate_limit: f64) -> ControlResult<Self> {
        gains.validate()?;
        if !(rate_limit.is_finite() && rate_limit > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "rate_limit must be positive",
            });
        }
        Ok(Self {
            gains,
            rate_limit,
            state: StcState::default(),
        })
    }

    pub fn gains(&self) -> &StcGains {
        &self.gains
    }

    pub fn state(&self) -> &StcState {
        &self.state
    }

    /// Advance with error `power - demand`, returning `(raw, clamped)` commands.
    pub fn advance(&mut self, error: f64, dt: f64) -> (f64, f64) {
        let (next, raw, output) = self.gains.update(&self.state, error, dt, self.rate_limit);
        self.state = next;
        (raw, output)
    }

    pub fn clear(&mut self) {
        self.state = StcState::default();
    }
}
