//! Plant state and its flat vector form.

use nalgebra::SVector;
use serde::{Deserialize, Serialize};

use crate::error::{PlantError, PlantResult};
use crate::kinetics::NUM_GROUPS;

/// Power + six precursor groups + fuel and moderator temperatures.
pub const STATE_DIM: usize = NUM_GROUPS + 3;

/// Flat ODE state: `[P, C1..C6, T_fuel, T_mod]`.
pub type StateVector = SVector<f64, STATE_DIM>;

const POWER: usize = 0;
const FIRST_GROUP: usize = 1;
const FUEL_TEMP: usize = NUM_GROUPS + 1;
const MOD_TEMP: usize = NUM_GROUPS + 2;

/// Lumped reactor state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantState {
    /// Relative neutron power (1.0 = nominal).
    pub power: f64,
    /// Delayed-neutron precursor concentrations, in power units.
    pub precursors: [f64; NUM_GROUPS],
    /// Fuel temperature (K)
    pub fuel_temp_k: f64,
    /// Moderator temperature (K)
    pub moderator_temp_k: f64,
}

impl PlantState {
    pub fn to_vector(&self) -> StateVector {
        let mut x = StateVector::zeros();
        x[POWER] = self.power;
        for (i, c) in self.precursors.iter().enumerate() {
            x[FIRST_GROUP + i] = *c;
        }
        x[FUEL_TEMP] = self.fuel_temp_k;
        x[MOD_TEMP] = self.moderator_temp_k;
        x
    }

    pub fn from_vector(x: &StateVector) -> Self {
        let mut precursors = [0.0; NUM_GROUPS];
        for (i, c) in precursors.iter_mut().enumerate() {
            *c = x[FIRST_GROUP + i];
        }
        Self {
            power: x[POWER],
            precursors,
            fuel_temp_k: x[FUEL_TEMP],
            moderator_temp_k: x[MOD_TEMP],
        }
    }

    /// Reject states that signal a diverging trajectory.
    ///
    /// Power must be finite and strictly positive; every other component finite.
    /// Negative precursors are not rejected here.
    pub fn check_physical(&self) -> PlantResult<()> {
        if !self.power.is_finite() {
            return Err(PlantError::InvalidState {
                what: "power is not finite",
                value: self.power,
            });
        }
        if self.power <= 0.0 {
            return Err(PlantError::InvalidState {
                what: "power is not positive",
                value: self.power,
            });
        }
        if let Some(c) = self.precursors.iter().find(|c| !c.is_finite()) {
            return Err(PlantError::InvalidState {
                what: "precursor concentration is not finite",
                value: *c,
            });
        }
        if !self.fuel_temp_k.is_finite() {
            return Err(PlantError::InvalidState {
                what: "fuel temperature is not finite",
                value: self.fuel_temp_k,
            });
        }
        if !self.moderator_temp_k.is_finite() {
            return Err(PlantError::InvalidState {
                what: "moderator temperature is not finite",
                value: self.moderator_temp_k,
            });
        }
        Ok(())
    }

    /// True when power and every precursor group are non-negative.
    pub fn is_non_negative(&self) -> bool {
        self.power >= 0.0 && self.precursors.iter().all(|c| *c >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PlantState {
        PlantState {
            power: 1.0,
            precursors: [1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            fuel_temp_k: 1105.0,
            moderator_temp_k: 1087.0,
        }
    }

    #[test]
    fn vector_layout() {
        let x = sample().to_vector();
        assert_eq!(x[0], 1.0);
        assert_eq!(x[1], 1.0);
        assert_eq!(x[6], 6.0);
        assert_eq!(x[7], 1105.0);
        assert_eq!(x[8], 1087.0);
        assert_eq!(PlantState::from_vector(&x), sample());
    }

    #[test]
    fn zero_power_is_invalid() {
        let mut s = sample();
        s.power = 0.0;
        assert!(matches!(
            s.check_physical(),
            Err(PlantError::InvalidState { .. })
        ));
    }

    #[test]
    fn nan_temperature_is_invalid() {
        let mut s = sample();
        s.moderator_temp_k = f64::NAN;
        assert!(s.check_physical().is_err());
    }

    #[test]
    fn negative_precursor_is_reported_but_not_rejected() {
        let mut s = sample();
        s.precursors[3] = -1e-9;
        assert!(s.check_physical().is_ok());
        assert!(!s.is_non_negative());
    }
}
