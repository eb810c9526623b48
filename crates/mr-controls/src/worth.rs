//! Drum reactivity worth curves.
//!
//! Every curve is expressed per drum and is zero at its critical angle, the
//! angle at which the bank exactly cancels the core's excess reactivity at the
//! design point. Angles are in degrees.

use mr_core::units::{as_radians, deg};
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorthCurve {
    /// `w(θ) = W (cos θc - cos θ) / 2`: S-shaped, flat at 0° and 180°.
    Sinusoidal {
        /// Full 0°-180° worth of one drum (Δk/k)
        drum_worth: f64,
        critical_angle_deg: f64,
    },
    /// `w(θ) = k (θ - θc)`: constant differential worth.
    Linear {
        worth_per_deg: f64,
        critical_angle_deg: f64,
    },
}

impl WorthCurve {
    pub fn validate(&self) -> ControlResult<()> {
        let (worth, angle) = match self {
            WorthCurve::Sinusoidal {
                drum_worth,
                critical_angle_deg,
            } => (*drum_worth, *critical_angle_deg),
            WorthCurve::Linear {
                worth_per_deg,
                critical_angle_deg,
            } => (*worth_per_deg, *critical_angle_deg),
        };
        if !(worth.is_finite() && worth > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "drum worth must be positive",
            });
        }
        if !angle.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "critical angle must be finite",
            });
        }
        Ok(())
    }

    pub fn critical_angle_deg(&self) -> f64 {
        match self {
            WorthCurve::Sinusoidal {
                critical_angle_deg, ..
            }
            | WorthCurve::Linear {
                critical_angle_deg, ..
            } => *critical_angle_deg,
        }
    }

    /// Reactivity of one drum at `angle_deg`.
    pub fn reactivity(&self, angle_deg: f64) -> f64 {
        match self {
            WorthCurve::Sinusoidal {
                drum_worth,
                critical_angle_deg,
            } => {
                let c0 = as_radians(deg(*critical_angle_deg)).cos();
                let c = as_radians(deg(angle_deg)).cos();
                0.5 * drum_worth * (c0 - c)
            }
            WorthCurve::Linear {
                worth_per_deg,
                critical_angle_deg,
            } => worth_per_deg * (angle_deg - critical_angle_deg),
        }
    }

    /// Differential worth `dw/dθ` of one drum (Δk/k per degree).
    pub fn differential(&self, angle_deg: f64) -> f64 {
        match self {
            WorthCurve::Sinusoidal { drum_worth, .. } => {
                0.5 * drum_worth * as_radians(deg(angle_deg)).sin() * as_radians(deg(1.0))
            }
            WorthCurve::Linear { worth_per_deg, .. } => *worth_per_deg,
        }
    }

    /// Angle in `[min_deg, max_deg]` whose per-drum reactivity is closest to `rho`.
    pub fn angle_for(&self, rho: f64, min_deg: f64, max_deg: f64) -> f64 {
        let angle = match self {
            WorthCurve::Sinusoidal {
                drum_worth,
                critical_angle_deg,
            } => {
                let c0 = as_radians(deg(*critical_angle_deg)).cos();
                let c = (c0 - 2.0 * rho / drum_worth).clamp(-1.0, 1.0);
                c.acos().to_degrees()
            }
            WorthCurve::Linear {
                worth_per_deg,
                critical_angle_deg,
            } => critical_angle_deg + rho / worth_per_deg,
        };
        angle.clamp(min_deg, max_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sinusoid() -> WorthCurve {
        WorthCurve::Sinusoidal {
            drum_worth: 4.0e-3,
            critical_angle_deg: 90.0,
        }
    }

    #[test]
    fn zero_at_critical_angle() {
        assert!(sinusoid().reactivity(90.0).abs() < 1e-18);
        let lin = WorthCurve::Linear {
            worth_per_deg: 2.77e-5,
            critical_angle_deg: 170.0,
        };
        assert_eq!(lin.reactivity(170.0), 0.0);
    }

    #[test]
    fn sinusoid_spans_full_worth() {
        let c = sinusoid();
        let span = c.reactivity(180.0) - c.reactivity(0.0);
        assert!((span - 4.0e-3).abs() < 1e-15);
    }

    #[test]
    fn differential_matches_finite_difference() {
        let c = sinusoid();
        let h = 1e-4;
        for angle in [10.0, 45.0, 90.0, 135.0, 170.0] {
            let fd = (c.reactivity(angle + h) - c.reactivity(angle - h)) / (2.0 * h);
            assert!((fd - c.differential(angle)).abs() < 1e-10);
        }
    }

    #[test]
    fn inverse_recovers_angle() {
        let c = sinusoid();
        let rho = c.reactivity(120.0);
        assert!((c.angle_for(rho, 0.0, 180.0) - 120.0).abs() < 1e-9);
    }

    #[test]
    fn inverse_saturates_outside_range() {
        let c = sinusoid();
        assert_eq!(c.angle_for(1.0, 0.0, 180.0), 180.0);
        assert_eq!(c.angle_for(-1.0, 0.0, 180.0), 0.0);
    }

    #[test]
    fn rejects_non_positive_worth() {
        let c = WorthCurve::Linear {
            worth_per_deg: 0.0,
            critical_angle_deg: 90.0,
        };
        assert!(c.validate().is_err());
    }
}
