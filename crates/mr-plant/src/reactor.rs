//! Reactor plant: kinetics + thermal feedback advanced by a fixed step.

use crate::error::{PlantError, PlantResult};
use crate::integrator::{ForwardEuler, Integrator, IntegratorType, RK4};
use crate::kinetics::{KineticsParams, NUM_GROUPS};
use crate::model::TransientModel;
use crate::state::{PlantState, StateVector};
use crate::thermal::{ThermalDesign, ThermalParams};

/// Full set of plant coefficients.
#[derive(Clone, Debug, PartialEq)]
pub struct ReactorParams {
    pub kinetics: KineticsParams,
    pub thermal: ThermalParams,
}

impl ReactorParams {
    pub fn new(kinetics: KineticsParams, thermal: &ThermalDesign) -> PlantResult<Self> {
        kinetics.validate()?;
        Ok(Self {
            kinetics,
            thermal: ThermalParams::from_design(thermal)?,
        })
    }

    /// Default microreactor design.
    pub fn microreactor() -> PlantResult<Self> {
        Self::new(KineticsParams::default(), &ThermalDesign::default())
    }

    /// Right-hand side of the 9-state system for a given external (drum) reactivity.
    pub fn derivatives(&self, x: &StateVector, drum_reactivity: f64) -> StateVector {
        let k = &self.kinetics;
        let th = &self.thermal;

        let power = x[0];
        let fuel = x[NUM_GROUPS + 1];
        let moderator = x[NUM_GROUPS + 2];
        let rho = drum_reactivity + th.feedback_reactivity(fuel, moderator);

        let mut dx = StateVector::zeros();
        let mut delayed_source = 0.0;
        for i in 0..NUM_GROUPS {
            let c = x[1 + i];
            delayed_source += k.lambda_per_s[i] * c;
            dx[1 + i] = k.beta[i] / k.generation_time_s * power - k.lambda_per_s[i] * c;
        }
        dx[0] = (rho - k.total_beta()) / k.generation_time_s * power + delayed_source;

        let (dtf, dtm) = th.temperature_rates(power, fuel, moderator);
        dx[NUM_GROUPS + 1] = dtf;
        dx[NUM_GROUPS + 2] = dtm;
        dx
    }
}

/// Drum reactivity held constant across one step (zero-order hold), feedback
/// re-evaluated at every integrator stage.
struct HeldReactivity<'a> {
    params: &'a ReactorParams,
    drum_reactivity: f64,
}

impl TransientModel for HeldReactivity<'_> {
    type State = StateVector;

    fn rhs(&self, x: &StateVector) -> PlantResult<StateVector> {
        Ok(self.params.derivatives(x, self.drum_reactivity))
    }

    fn add(&self, a: &StateVector, b: &StateVector) -> StateVector {
        a + b
    }

    fn scale(&self, a: &StateVector, scale: f64) -> StateVector {
        a * scale
    }
}

/// The reactor plant.
#[derive(Clone, Debug)]
pub struct Reactor {
    params: ReactorParams,
    integrator: IntegratorType,
}

impl Reactor {
    pub fn new(params: ReactorParams, integrator: IntegratorType) -> Self {
        Self { params, integrator }
    }

    pub fn params(&self) -> &ReactorParams {
        &self.params
    }

    pub fn integrator(&self) -> IntegratorType {
        self.integrator
    }

    /// Steady state at a held relative power: precursors and temperatures in
    /// equilibrium with `power`.
    pub fn steady_state(&self, power: f64) -> PlantResult<PlantState> {
        if !(power.is_finite() && power > 0.0) {
            return Err(PlantError::InvalidArg {
                what: "initial power must be positive",
            });
        }
        let (fuel, moderator) = self.params.thermal.equilibrium_temperatures(power);
        Ok(PlantState {
            power,
            precursors: self.params.kinetics.equilibrium_precursors(power),
            fuel_temp_k: fuel,
            moderator_temp_k: moderator,
        })
    }

    /// Temperature feedback reactivity of a state.
    pub fn feedback_reactivity(&self, state: &PlantState) -> f64 {
        self.params
            .thermal
            .feedback_reactivity(state.fuel_temp_k, state.moderator_temp_k)
    }

    /// Drum plus feedback reactivity.
    pub fn total_reactivity(&self, state: &PlantState, drum_reactivity: f64) -> f64 {
        drum_reactivity + self.feedback_reactivity(state)
    }

    /// Raw state derivative, mainly for diagnostics.
    pub fn derivatives(&self, state: &PlantState, drum_reactivity: f64) -> StateVector {
        self.params.derivatives(&state.to_vector(), drum_reactivity)
    }

    /// Advance `state` by `dt` with the drum reactivity held constant.
    ///
    /// The input is not modified. Returns `PlantError::InvalidState` when the
    /// new state has non-positive or non-finite power, or any non-finite entry.
    pub fn step(
        &self,
        state: &PlantState,
        drum_reactivity: f64,
        dt: f64,
    ) -> PlantResult<PlantState> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(PlantError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if !drum_reactivity.is_finite() {
            return Err(PlantError::InvalidArg {
                what: "drum reactivity must be finite",
            });
        }

        let model = HeldReactivity {
            params: &self.params,
            drum_reactivity,
        };
        let x = state.to_vector();
        let x_next = match self.integrator {
            IntegratorType::RK4 => RK4.step(&model, &x, dt)?,
            IntegratorType::ForwardEuler => ForwardEuler.step(&model, &x, dt)?,
        };

        let next = PlantState::from_vector(&x_next);
        next.check_physical()?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reactor() -> Reactor {
        Reactor::new(ReactorParams::microreactor().unwrap(), IntegratorType::RK4)
    }

    #[test]
    fn steady_state_has_zero_derivative() {
        let r = reactor();
        let s = r.steady_state(1.0).unwrap();
        let dx = r.derivatives(&s, 0.0);
        for (i, v) in dx.iter().enumerate() {
            assert!(v.abs() < 1e-9, "component {i} drifts at {v}");
        }
    }

    #[test]
    fn partial_power_steady_state_needs_balancing_reactivity() {
        let r = reactor();
        let s = r.steady_state(0.5).unwrap();
        let rho_fb = r.feedback_reactivity(&s);
        // Colder core -> positive feedback that the drums must cancel.
        assert!(rho_fb > 0.0);
        let dx = r.derivatives(&s, -rho_fb);
        assert!(dx[0].abs() < 1e-9);
    }

    #[test]
    fn step_does_not_mutate_input() {
        let r = reactor();
        let s = r.steady_state(1.0).unwrap();
        let before = s.clone();
        let _ = r.step(&s, 1e-4, 0.01).unwrap();
        assert_eq!(s, before);
    }

    #[test]
    fn positive_reactivity_raises_power() {
        let r = reactor();
        let mut s = r.steady_state(1.0).unwrap();
        for _ in 0..100 {
            s = r.step(&s, 2e-4, 0.01).unwrap();
        }
        assert!(s.power > 1.0);
    }

    #[test]
    fn prompt_jump_is_roughly_rho_over_beta() {
        let r = reactor();
        let mut s = r.steady_state(1.0).unwrap();
        let rho = -2.4e-4;
        // A few prompt time constants (Lambda/beta ~ 0.35 s); the short-lived
        // groups then pull power slightly below the prompt-jump level.
        for _ in 0..100 {
            s = r.step(&s, rho, 0.01).unwrap();
        }
        let beta = r.params().kinetics.total_beta();
        let expected = beta / (beta - rho);
        assert!(s.power < 1.0);
        assert!((s.power - expected).abs() < 0.03, "P = {}", s.power);
    }

    #[test]
    fn rejects_bad_step() {
        let r = reactor();
        let s = r.steady_state(1.0).unwrap();
        assert!(r.step(&s, 0.0, 0.0).is_err());
        assert!(r.step(&s, f64::NAN, 0.01).is_err());
    }

    #[test]
    fn large_negative_reactivity_with_coarse_euler_fails() {
        let r = Reactor::new(
            ReactorParams::microreactor().unwrap(),
            IntegratorType::ForwardEuler,
        );
        let s = r.steady_state(1.0).unwrap();
        // dt far beyond the prompt stability limit drives power negative.
        let err = r.step(&s, -0.5, 0.1).unwrap_err();
        assert!(matches!(err, PlantError::InvalidState { .. }));
    }
}
