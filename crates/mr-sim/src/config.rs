//! Run configuration.

use mr_controls::{
    ControllerConfig, ControllerKind, DrumBank, DrumLimits, DrumState, SUPPORTED_DRUM_COUNTS,
    WorthCurve, preset_bank, preset_controller,
};
use mr_core::{Tolerances, nearly_equal};
use mr_plant::{IntegratorType, PlantState, Reactor, ReactorParams};
use serde::{Deserialize, Serialize};

use crate::demand::LoadDemand;
use crate::error::{SimError, SimResult};

/// Largest accepted step (seconds).
pub const MAX_DT_S: f64 = 0.1;

/// Upper bound on the number of steps in one run.
pub const MAX_STEPS: usize = 50_000_000;

/// Largest reactivity (Δk/k) the drums may leave uncancelled at equilibrium.
pub const BALANCE_TOL: f64 = 1e-9;

/// Steady plant state at `power` and the drum position that holds it there.
///
/// # Errors
///
/// Returns `SimError::Config` if the bank's travel cannot cancel the
/// temperature feedback at that power.
pub fn equilibrium(
    bank: &DrumBank,
    reactor: &Reactor,
    power: f64,
) -> SimResult<(PlantState, DrumState)> {
    let plant = reactor.steady_state(power)?;
    let rho_fb = reactor.feedback_reactivity(&plant);
    let drum = bank.state_for_reactivity(-rho_fb);
    let residual = bank.reactivity(drum.angle_deg) + rho_fb;
    if residual.abs() > BALANCE_TOL {
        return Err(SimError::Config(format!(
            "{} drum(s) cannot hold power {power}: {residual:.3e} left at {} deg",
            bank.count(),
            drum.angle_deg
        )));
    }
    Ok((plant, drum))
}

/// Drum hardware: how many drums, their worth curve and their limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrumConfig {
    pub count: usize,
    pub curve: WorthCurve,
    #[serde(default)]
    pub limits: DrumLimits,
}

impl DrumConfig {
    /// Reference hardware for `count` drums.
    pub fn preset(count: usize) -> SimResult<Self> {
        let bank = preset_bank(count)?;
        Ok(Self {
            count,
            curve: bank.curve().clone(),
            limits: bank.limits().clone(),
        })
    }

    pub fn build(&self) -> SimResult<DrumBank> {
        Ok(DrumBank::new(
            self.count,
            self.curve.clone(),
            self.limits.clone(),
        )?)
    }
}

/// Everything needed to run one closed-loop simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub controller: ControllerConfig,
    pub drums: DrumConfig,
    /// Fixed step (seconds)
    pub dt_s: f64,
    /// Final time (seconds)
    pub horizon_s: f64,
    pub demand: LoadDemand,
    /// Relative power of the initial steady state
    #[serde(default = "default_initial_power")]
    pub initial_power: f64,
    #[serde(default)]
    pub integrator: IntegratorType,
    /// Record every N-th step (the final step is always recorded)
    #[serde(default = "default_record_every")]
    pub record_every: usize,
}

fn default_initial_power() -> f64 {
    1.0
}

fn default_record_every() -> usize {
    1
}

impl SimConfig {
    /// Reference gains and hardware for `kind` with `count` drums, holding
    /// nominal power for 100 s at a 10 ms step.
    pub fn preset(kind: ControllerKind, count: usize) -> SimResult<Self> {
        let drums = DrumConfig::preset(count)?;
        let controller = preset_controller(kind, &drums.build()?);
        Ok(Self {
            controller,
            drums,
            dt_s: 0.01,
            horizon_s: 100.0,
            demand: LoadDemand::constant(1.0)?,
            initial_power: 1.0,
            integrator: IntegratorType::default(),
            record_every: 1,
        })
    }

    pub fn with_demand(mut self, demand: LoadDemand) -> Self {
        self.demand = demand;
        self
    }

    pub fn with_horizon(mut self, horizon_s: f64) -> Self {
        self.horizon_s = horizon_s;
        self
    }

    pub fn with_dt(mut self, dt_s: f64) -> Self {
        self.dt_s = dt_s;
        self
    }

    pub fn with_record_every(mut self, record_every: usize) -> Self {
        self.record_every = record_every;
        self
    }

    /// Same run with reference hardware and gains for another controller
    /// and drum count.
    pub fn retarget(&self, kind: ControllerKind, count: usize) -> SimResult<Self> {
        let preset = Self::preset(kind, count)?;
        Ok(Self {
            controller: preset.controller,
            drums: preset.drums,
            ..self.clone()
        })
    }

    /// Number of fixed steps to reach the horizon.
    pub fn steps(&self) -> usize {
        let n = self.horizon_s / self.dt_s;
        let rounded = n.round();
        let tol = Tolerances {
            abs: 1e-9,
            rel: 1e-9,
        };
        if nearly_equal(n, rounded, tol) {
            rounded as usize
        } else {
            n.ceil() as usize
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if !SUPPORTED_DRUM_COUNTS.contains(&self.drums.count) {
            return Err(SimError::Config(format!(
                "drum count {} is not one of 1, 2, 4, 8",
                self.drums.count
            )));
        }
        if !(self.dt_s.is_finite() && self.dt_s > 0.0 && self.dt_s <= MAX_DT_S) {
            return Err(SimError::Config(format!(
                "dt_s = {} must be in (0, {MAX_DT_S}]",
                self.dt_s
            )));
        }
        if !(self.horizon_s.is_finite() && self.horizon_s > 0.0) {
            return Err(SimError::Config(format!(
                "horizon_s = {} must be positive",
                self.horizon_s
            )));
        }
        if self.steps() > MAX_STEPS {
            return Err(SimError::Config(format!(
                "{} steps exceeds the limit of {MAX_STEPS}",
                self.steps()
            )));
        }
        if self.record_every == 0 {
            return Err(SimError::Config("record_every must be at least 1".into()));
        }
        if !(self.initial_power.is_finite() && self.initial_power > 0.0) {
            return Err(SimError::Config(format!(
                "initial_power = {} must be positive",
                self.initial_power
            )));
        }
        // Re-check breakpoints: deserialized demands are validated too, but a
        // caller may have built the struct by hand.
        LoadDemand::new(self.demand.points().to_vec())?;
        self.controller.validate()?;

        // Every level the run starts at or is asked to reach must be one the
        // drums can hold.
        let bank = self.drums.build()?;
        let reactor = Reactor::new(ReactorParams::microreactor()?, self.integrator);
        for power in [
            self.initial_power,
            self.demand.min_power(),
            self.demand.max_power(),
        ] {
            equilibrium(&bank, &reactor, power)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate_for_every_combination() {
        for count in SUPPORTED_DRUM_COUNTS {
            for kind in ControllerKind::ALL {
                let cfg = SimConfig::preset(kind, count).unwrap();
                cfg.validate().unwrap();
                assert_eq!(cfg.controller.kind(), kind);
                assert_eq!(cfg.steps(), 10_000);
            }
        }
    }

    #[test]
    fn rejects_bad_drum_count() {
        assert!(SimConfig::preset(ControllerKind::Pid, 3).is_err());
        let mut cfg = SimConfig::preset(ControllerKind::Pid, 4).unwrap();
        cfg.drums.count = 6;
        assert!(matches!(cfg.validate(), Err(SimError::Config(_))));
    }

    #[test]
    fn rejects_bad_timing() {
        let base = SimConfig::preset(ControllerKind::SuperTwisting, 8).unwrap();
        assert!(base.clone().with_dt(0.0).validate().is_err());
        assert!(base.clone().with_dt(0.5).validate().is_err());
        assert!(base.clone().with_dt(f64::NAN).validate().is_err());
        assert!(base.clone().with_horizon(-1.0).validate().is_err());
        assert!(base.clone().with_record_every(0).validate().is_err());
    }

    #[test]
    fn rejects_negative_gain() {
        let mut cfg = SimConfig::preset(ControllerKind::Pid, 2).unwrap();
        if let ControllerConfig::Pid(g) = &mut cfg.controller {
            g.ki = -1.0;
        }
        assert!(matches!(cfg.validate(), Err(SimError::Control(_))));
    }

    #[test]
    fn step_count_tolerates_rounding() {
        let cfg = SimConfig::preset(ControllerKind::Pid, 8)
            .unwrap()
            .with_dt(0.1)
            .with_horizon(0.3);
        assert_eq!(cfg.steps(), 3);
        let cfg = cfg.with_horizon(0.35);
        assert_eq!(cfg.steps(), 4);
    }

    #[test]
    fn rejects_initial_power_the_drums_cannot_hold() {
        // One drum has 4.7e-3 of negative travel; holding 0.2 needs about 5.8e-3.
        let mut cfg = SimConfig::preset(ControllerKind::Pid, 1)
            .unwrap()
            .with_demand(LoadDemand::constant(1.0).unwrap());
        cfg.initial_power = 0.2;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, SimError::Config(ref m) if m.contains("cannot hold")), "{err}");
    }

    #[test]
    fn rejects_demand_outside_balanceable_range() {
        // Two drums reach down to about 0.17 of nominal.
        let cfg = SimConfig::preset(ControllerKind::SuperTwisting, 2).unwrap();
        let deep = LoadDemand::step(1.0, 0.1, 10.0).unwrap();
        assert!(cfg.clone().with_demand(deep).validate().is_err());
        let half = LoadDemand::step(1.0, 0.5, 10.0).unwrap();
        assert!(cfg.with_demand(half).validate().is_ok());
    }

    #[test]
    fn every_bank_holds_its_load_follow_cycle() {
        for count in SUPPORTED_DRUM_COUNTS {
            let demand = LoadDemand::load_follow(count).unwrap();
            let mut cfg = SimConfig::preset(ControllerKind::Pid, count)
                .unwrap()
                .with_demand(demand.clone())
                .with_horizon(6000.0);
            cfg.initial_power = demand.initial();
            cfg.validate().unwrap();
        }
    }

    #[test]
    fn retarget_keeps_timing_and_demand() {
        let base = SimConfig::preset(ControllerKind::Pid, 8)
            .unwrap()
            .with_horizon(42.0)
            .with_demand(LoadDemand::step(1.0, 1.1, 5.0).unwrap());
        let other = base.retarget(ControllerKind::SuperTwisting, 2).unwrap();
        assert_eq!(other.horizon_s, 42.0);
        assert_eq!(other.demand, base.demand);
        assert_eq!(other.drums.count, 2);
        assert_eq!(other.controller.kind(), ControllerKind::SuperTwisting);
    }
}
