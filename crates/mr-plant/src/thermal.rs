//! Two-node thermal model (fuel, moderator) with temperature feedback.
//!
//! ```text
//! mu_f dTf/dt = f_f Q0 P - K_fm (Tf - Tm)
//! mu_m dTm/dt = (1 - f_f) Q0 P + K_fm (Tf - Tm) - K_mc (Tm - Tc)
//! rho_fb      = alpha_f (Tf - Tf0) + alpha_m (Tm - Tm0)
//! ```
//!
//! The conductances are derived from the nominal temperatures so that
//! `P = 1, Tf = Tf0, Tm = Tm0` is an exact equilibrium. The coolant enters as a
//! fixed average-temperature boundary `Tc`.

use mr_core::units::{
    HeatCapacity, Power, Temperature, as_j_per_k, as_kelvin, as_watts, j_per_k, k, mw,
};

use crate::error::{PlantError, PlantResult};

/// Physical design inputs, in SI quantities.
#[derive(Clone, Debug)]
pub struct ThermalDesign {
    /// Thermal power at 1.0 pu
    pub nominal_power: Power,
    /// Fraction of the power deposited in the fuel
    pub fuel_fraction: f64,
    pub fuel_heat_capacity: HeatCapacity,
    pub moderator_heat_capacity: HeatCapacity,
    pub fuel_nominal: Temperature,
    pub moderator_nominal: Temperature,
    pub coolant_inlet: Temperature,
    pub coolant_outlet: Temperature,
    /// Fuel temperature reactivity coefficient (1/K)
    pub alpha_fuel_per_k: f64,
    /// Moderator temperature reactivity coefficient (1/K)
    pub alpha_moderator_per_k: f64,
}

impl Default for ThermalDesign {
    fn default() -> Self {
        Self {
            nominal_power: mw(22.0),
            fuel_fraction: 0.96,
            fuel_heat_capacity: j_per_k(2002.0 * 977.0),
            moderator_heat_capacity: j_per_k(11573.0 * 1697.0),
            fuel_nominal: k(1105.0),
            moderator_nominal: k(1087.0),
            coolant_inlet: k(864.0),
            coolant_outlet: k(1106.0),
            alpha_fuel_per_k: -2.875e-5,
            alpha_moderator_per_k: -3.696e-5,
        }
    }
}

/// Plain-number coefficients used by the right-hand side.
#[derive(Clone, Debug, PartialEq)]
pub struct ThermalParams {
    pub nominal_power_w: f64,
    pub fuel_fraction: f64,
    pub fuel_heat_capacity_j_per_k: f64,
    pub moderator_heat_capacity_j_per_k: f64,
    /// Fuel-to-moderator conductance (W/K)
    pub fuel_to_moderator_w_per_k: f64,
    /// Moderator-to-coolant conductance (W/K)
    pub moderator_to_coolant_w_per_k: f64,
    pub fuel_nominal_k: f64,
    pub moderator_nominal_k: f64,
    pub coolant_k: f64,
    pub alpha_fuel_per_k: f64,
    pub alpha_moderator_per_k: f64,
}

impl ThermalParams {
    pub fn from_design(design: &ThermalDesign) -> PlantResult<Self> {
        let q0 = as_watts(design.nominal_power);
        let mu_f = as_j_per_k(design.fuel_heat_capacity);
        let mu_m = as_j_per_k(design.moderator_heat_capacity);
        let tf0 = as_kelvin(design.fuel_nominal);
        let tm0 = as_kelvin(design.moderator_nominal);
        let tc = 0.5 * (as_kelvin(design.coolant_inlet) + as_kelvin(design.coolant_outlet));

        if !(q0.is_finite() && q0 > 0.0) {
            return Err(PlantError::InvalidArg {
                what: "nominal power must be positive",
            });
        }
        if !(design.fuel_fraction > 0.0 && design.fuel_fraction <= 1.0) {
            return Err(PlantError::InvalidArg {
                what: "fuel power fraction must be in (0, 1]",
            });
        }
        if !(mu_f > 0.0 && mu_m > 0.0) {
            return Err(PlantError::InvalidArg {
                what: "heat capacities must be positive",
            });
        }
        if !(tf0 > tm0 && tm0 > tc) {
            return Err(PlantError::InvalidArg {
                what: "nominal temperatures must satisfy fuel > moderator > coolant",
            });
        }
        if !(design.alpha_fuel_per_k.is_finite() && design.alpha_moderator_per_k.is_finite()) {
            return Err(PlantError::InvalidArg {
                what: "reactivity coefficients must be finite",
            });
        }

        Ok(Self {
            nominal_power_w: q0,
            fuel_fraction: design.fuel_fraction,
            fuel_heat_capacity_j_per_k: mu_f,
            moderator_heat_capacity_j_per_k: mu_m,
            fuel_to_moderator_w_per_k: design.fuel_fraction * q0 / (tf0 - tm0),
            moderator_to_coolant_w_per_k: q0 / (tm0 - tc),
            fuel_nominal_k: tf0,
            moderator_nominal_k: tm0,
            coolant_k: tc,
            alpha_fuel_per_k: design.alpha_fuel_per_k,
            alpha_moderator_per_k: design.alpha_moderator_per_k,
        })
    }

    /// Temperature feedback reactivity.
    pub fn feedback_reactivity(&self, fuel_temp_k: f64, moderator_temp_k: f64) -> f64 {
        self.alpha_fuel_per_k * (fuel_temp_k - self.fuel_nominal_k)
            + self.alpha_moderator_per_k * (moderator_temp_k - self.moderator_nominal_k)
    }

    /// `(dTf/dt, dTm/dt)` in K/s.
    pub fn temperature_rates(
        &self,
        power: f64,
        fuel_temp_k: f64,
        moderator_temp_k: f64,
    ) -> (f64, f64) {
        let q = self.nominal_power_w * power;
        let fuel_to_mod = self.fuel_to_moderator_w_per_k * (fuel_temp_k - moderator_temp_k);
        let mod_to_coolant =
            self.moderator_to_coolant_w_per_k * (moderator_temp_k - self.coolant_k);

        let dtf = (self.fuel_fraction * q - fuel_to_mod) / self.fuel_heat_capacity_j_per_k;
        let dtm = ((1.0 - self.fuel_fraction) * q + fuel_to_mod - mod_to_coolant)
            / self.moderator_heat_capacity_j_per_k;
        (dtf, dtm)
    }

    /// Steady `(Tf, Tm)` for a held relative power.
    pub fn equilibrium_temperatures(&self, power: f64) -> (f64, f64) {
        let q = self.nominal_power_w * power;
        let tm = self.coolant_k + q / self.moderator_to_coolant_w_per_k;
        let tf = tm + self.fuel_fraction * q / self.fuel_to_moderator_w_per_k;
        (tf, tm)
    }

    /// Static feedback reactivity per unit power change (negative when stabilizing).
    pub fn power_coefficient(&self) -> f64 {
        let (tf1, tm1) = self.equilibrium_temperatures(1.0);
        let (tf0, tm0) = self.equilibrium_temperatures(0.0);
        self.alpha_fuel_per_k * (tf1 - tf0) + self.alpha_moderator_per_k * (tm1 - tm0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ThermalParams {
        ThermalParams::from_design(&ThermalDesign::default()).unwrap()
    }

    #[test]
    fn nominal_point_is_equilibrium() {
        let p = params();
        let (dtf, dtm) = p.temperature_rates(1.0, p.fuel_nominal_k, p.moderator_nominal_k);
        assert!(dtf.abs() < 1e-9, "dTf = {dtf}");
        assert!(dtm.abs() < 1e-9, "dTm = {dtm}");
        assert_eq!(p.feedback_reactivity(p.fuel_nominal_k, p.moderator_nominal_k), 0.0);
    }

    #[test]
    fn coolant_is_mean_of_inlet_and_outlet() {
        assert!((params().coolant_k - 985.0).abs() < 1e-12);
    }

    #[test]
    fn equilibrium_at_nominal_power_matches_design() {
        let p = params();
        let (tf, tm) = p.equilibrium_temperatures(1.0);
        assert!((tf - 1105.0).abs() < 1e-9);
        assert!((tm - 1087.0).abs() < 1e-9);
    }

    #[test]
    fn feedback_is_stabilizing() {
        let p = params();
        assert!(p.power_coefficient() < 0.0);
        assert!(p.feedback_reactivity(1115.0, 1097.0) < 0.0);
    }

    #[test]
    fn rejects_inverted_temperatures() {
        let design = ThermalDesign {
            moderator_nominal: k(1200.0),
            ..ThermalDesign::default()
        };
        assert!(ThermalParams::from_design(&design).is_err());
    }
}
