//! Point-kinetics parameters with six delayed-neutron groups.

use mr_core::ensure_positive;

use crate::error::{PlantError, PlantResult};

/// Number of delayed-neutron precursor groups.
pub const NUM_GROUPS: usize = 6;

/// Point-kinetics constants.
///
/// Precursor concentrations are carried in power units, so the equations are
///
/// ```text
/// dP/dt  = (rho - beta) / Lambda * P + sum_i lambda_i * C_i
/// dCi/dt = beta_i / Lambda * P - lambda_i * C_i
/// ```
///
/// with `beta = sum_i beta_i`.
#[derive(Clone, Debug, PartialEq)]
pub struct KineticsParams {
    /// Prompt neutron generation time Lambda (s)
    pub generation_time_s: f64,
    /// Delayed-neutron fractions beta_i
    pub beta: [f64; NUM_GROUPS],
    /// Precursor decay constants lambda_i (1/s)
    pub lambda_per_s: [f64; NUM_GROUPS],
}

impl Default for KineticsParams {
    fn default() -> Self {
        Self {
            generation_time_s: 1.68e-3,
            beta: [
                1.42481e-4, 9.24281e-4, 7.79956e-4, 2.06583e-3, 6.71175e-4, 2.17806e-4,
            ],
            lambda_per_s: [1.272e-2, 3.174e-2, 1.160e-1, 3.110e-1, 1.400, 3.870],
        }
    }
}

impl KineticsParams {
    pub fn new(
        generation_time_s: f64,
        beta: [f64; NUM_GROUPS],
        lambda_per_s: [f64; NUM_GROUPS],
    ) -> PlantResult<Self> {
        let params = Self {
            generation_time_s,
            beta,
            lambda_per_s,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> PlantResult<()> {
        ensure_positive(self.generation_time_s, "generation time must be positive")?;
        for &b in &self.beta {
            ensure_positive(b, "delayed-neutron fractions must be positive")?;
        }
        for &l in &self.lambda_per_s {
            ensure_positive(l, "precursor decay constants must be positive")?;
        }
        if self.total_beta() >= 1.0 {
            return Err(PlantError::InvalidArg {
                what: "total delayed fraction must be below one",
            });
        }
        Ok(())
    }

    /// Total delayed-neutron fraction beta.
    pub fn total_beta(&self) -> f64 {
        self.beta.iter().sum()
    }

    /// Precursor concentrations in equilibrium with `power`.
    pub fn equilibrium_precursors(&self, power: f64) -> [f64; NUM_GROUPS] {
        let mut c = [0.0; NUM_GROUPS];
        for (i, ci) in c.iter_mut().enumerate() {
            *ci = self.beta[i] * power / (self.generation_time_s * self.lambda_per_s[i]);
        }
        c
    }

    /// Mean delayed-neutron holdback `sum_i beta_i / lambda_i` (s).
    ///
    /// Slow reactivity changes move power at roughly `rho / holdback` per second.
    pub fn delayed_holdback_s(&self) -> f64 {
        self.beta
            .iter()
            .zip(self.lambda_per_s.iter())
            .map(|(b, l)| b / l)
            .sum()
    }

    /// Prompt-jump gain `1 / beta`: fractional power change per unit of small
    /// reactivity before the delayed precursors respond.
    pub fn prompt_jump_gain(&self) -> f64 {
        1.0 / self.total_beta()
    }
}
