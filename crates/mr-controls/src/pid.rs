//! PID drum-rate controller.
//!
//! Error is `demand - power` (positive when the core is below demand) and the
//! output is a drum rate command in deg/s. Includes:
//! - Filtered derivative on the error
//! - Output clamping to the bank's slew limit
//! - Anti-windup: conditional integration, or back-calculation when `kaw > 0`

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

/// PID gains in drum-rate units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// (deg/s) per unit power error
    pub kp: f64,
    /// (deg/s) per unit power error-second
    pub ki: f64,
    /// (deg/s) per unit power error rate
    pub kd: f64,
    /// Derivative filter time constant (seconds); 0 = raw backward difference
    pub derivative_filter_s: f64,
    /// Back-calculation gain, unit power error per (deg/s) of clamping.
    /// 0 selects conditional integration instead.
    #[serde(default)]
    pub kaw: f64,
}

impl PidGains {
    pub fn validate(&self) -> ControlResult<()> {
        for (value, what) in [
            (self.kp, "kp must be finite and non-negative"),
            (self.ki, "ki must be finite and non-negative"),
            (self.kd, "kd must be finite and non-negative"),
            (self.kaw, "kaw must be finite and non-negative"),
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

    /// One sampled update.
    ///
    /// # Returns
    ///
    /// Updated state, the unclamped command and the clamped command.
    pub fn update(
        &self,
        state: &PidState,
        error: f64,
        dt: f64,
        rate_limit: f64,
    ) -> (PidState, f64, f64) {
        let p_term = self.kp * error;

        // Back-calculation feeds last step's clamping excess into the integral.
        let new_integral = state.integral + (error + self.kaw * state.clamp_excess) * dt;
        let i_term = self.ki * new_integral;

        // filt[n] = alpha * filt[n-1] + (1-alpha) * error; the first sample
        // seeds the filter so a nonzero initial error produces no kick.
        let (filtered_error, derivative) = match state.filtered_error {
            Some(prev) => {
                let alpha = self.derivative_filter_s / (self.derivative_filter_s + dt);
                let filt = alpha * prev + (1.0 - alpha) * error;
                (filt, (filt - prev) / dt)
            }
            None => (error, 0.0),
        };
        let d_term = self.kd * derivative;

        let raw = p_term + i_term + d_term;
        let output = raw.clamp(-rate_limit, rate_limit);

        let integral = if self.kaw > 0.0 || output == raw {
            new_integral
        } else {
            state.integral
        };

        let new_state = PidState {
            integral,
            filtered_error: Some(filtered_error),
            derivative,
            clamp_excess: output - raw,
        };
        (new_state, raw, output)
    }
}

/// PID memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PidState {
    pub integral: f64,
    /// `None` until the first sample.
    pub filtered_error: Option<f64>,
    pub derivative: f64,
    /// `clamped - raw` from the last update.
    #[serde(default)]
    pub clamp_excess: f64,
}

/// PID gains bound to a rate limit, owning its state.
#[derive(Debug, Clone, PartialEq)]
pub struct PidController {
    gains: PidGains,
    rate_limit: f64,
    state: PidState,
}

impl PidController {
    pub fn new(gains: PidGains, rate_limit: f64) -> ControlResult<Self> {
        gains.validate()?;
        if !(rate_limit.is_finite() && rate_limit > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "rate_limit must be positive",
            });
        }
        Ok(Self {
            gains,
            rate_limit,
            state: PidState::default(),
        })
    }

    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    pub fn state(&self) -> &PidState {
        &self.state
    }

    /// Advance with error `demand - power`, returning `(raw, clamped)` commands.
    pub fn advance(&mut self, error: f64, dt: f64) -> (f64, f64) {
        let (next, raw, output) = self.gains.update(&self.state, error, dt, self.rate_limit);
        self.state = next;
        (raw, output)
    }

    pub fn clear(&mut self) {
        self.state = PidState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gains() -> PidGains {
        PidGains {
            kp: 2.0,
            ki: 0.5,
            kd: 0.1,
            derivative_filter_s: 0.2,
            kaw: 0.0,
        }
    }

    #[test]
    fn zero_error_gives_zero_output() {
        let mut c = PidController::new(gains(), 1.0).unwrap();
        for _ in 0..10 {
            let (_, out) = c.advance(0.0, 0.01);
            assert_eq!(out, 0.0);
        }
    }

    #[test]
    fn first_sample_has_no_derivative_kick() {
        let mut c = PidController::new(gains(), 10.0).unwrap();
        let (raw, _) = c.advance(0.1, 0.01);
        assert!((raw - (2.0 * 0.1 + 0.5 * 0.1 * 0.01)).abs() < 1e-12);
        assert_eq!(c.state().derivative, 0.0);
    }

    #[test]
    fn output_is_clamped() {
        let mut c = PidController::new(gains(), 0.5).unwrap();
        let (raw, out) = c.advance(10.0, 0.01);
        assert!(raw > 0.5);
        assert_eq!(out, 0.5);
        let (_, out) = c.advance(-10.0, 0.01);
        assert_eq!(out, -0.5);
    }

    #[test]
    fn integral_frozen_while_saturated() {
        let mut c = PidController::new(gains(), 0.5).unwrap();
        for _ in 0..100 {
            c.advance(10.0, 0.01);
        }
        assert_eq!(c.state().integral, 0.0);
    }

    #[test]
    fn integral_accumulates_when_unsaturated() {
        let g = PidGains {
            kp: 0.0,
            ki: 1.0,
            kd: 0.0,
            derivative_filter_s: 0.2,
            kaw: 0.0,
        };
        let mut c = PidController::new(g, 10.0).unwrap();
        for _ in 0..10 {
            c.advance(1.0, 0.1);
        }
        assert!((c.state().integral - 1.0).abs() < 1e-12);
    }

    #[test]
    fn unfiltered_derivative_is_backward_difference() {
        let g = PidGains {
            kp: 0.0,
            ki: 0.0,
            kd: 1.0,
            derivative_filter_s: 0.0,
            kaw: 0.0,
        };
        let mut c = PidController::new(g, 10.0).unwrap();
        c.advance(0.1, 0.01);
        let (raw, _) = c.advance(0.2, 0.01);
        assert!((raw - 10.0).abs() < 1e-9);
    }

    #[test]
    fn back_calculation_bounds_integral_while_saturated() {
        let g = PidGains {
            kp: 0.0,
            ki: 1.0,
            kd: 0.0,
            derivative_filter_s: 0.0,
            kaw: 1.0,
        };
        let mut c = PidController::new(g, 0.5).unwrap();
        for _ in 0..200 {
            let (_, out) = c.advance(1.0, 0.1);
            assert!(out <= 0.5);
        }
        // Settles where error + kaw * (0.5 - integral) = 0.
        assert!((c.state().integral - 1.5).abs() < 1e-3, "{}", c.state().integral);
        assert!((c.state().clamp_excess + 1.0).abs() < 1e-3);
    }

    #[test]
    fn clear_resets_memory() {
        let mut c = PidController::new(gains(), 10.0).unwrap();
        c.advance(1.0, 0.1);
        c.clear();
        assert_eq!(c.state(), &PidState::default());
    }

    #[test]
    fn invalid_gains() {
        let mut g = gains();
        g.kp = -1.0;
        assert!(PidController::new(g, 1.0).is_err());
        let mut g = gains();
        g.derivative_filter_s = -0.1;
        assert!(g.validate().is_err());
        let mut g = gains();
        g.kaw = f64::NAN;
        assert!(g.validate().is_err());
        assert!(PidController::new(gains(), 0.0).is_err());
    }
}
