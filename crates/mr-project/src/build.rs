//! Scenario -> run configuration.

use mr_controls::{ControllerConfig, DrumLimits, WorthCurve, preset_bank, preset_controller};
use mr_plant::IntegratorType;
use mr_sim::{DemandPoint, DrumConfig, LoadDemand, SimConfig};

use crate::ProjectResult;
use crate::schema::{ControllerDef, DemandDef, IntegratorDef, Scenario, WorthDef};
use crate::validate::validate_scenario;

/// Validate `scenario` and resolve reference values for everything it leaves
/// out.
pub fn build_config(scenario: &Scenario) -> ProjectResult<SimConfig> {
    validate_scenario(scenario)?;

    let reference = preset_bank(scenario.drums.count)?;
    let curve = match &scenario.drums.worth {
        Some(WorthDef::Sinusoidal {
            drum_worth,
            critical_angle_deg,
        }) => WorthCurve::Sinusoidal {
            drum_worth: *drum_worth,
            critical_angle_deg: *critical_angle_deg,
        },
        Some(WorthDef::Linear {
            worth_per_deg,
            critical_angle_deg,
        }) => WorthCurve::Linear {
            worth_per_deg: *worth_per_deg,
            critical_angle_deg: *critical_angle_deg,
        },
        None => reference.curve().clone(),
    };
    let drums = DrumConfig {
        count: scenario.drums.count,
        curve,
        limits: DrumLimits {
            angle_min_deg: scenario.drums.angle_min_deg,
            angle_max_deg: scenario.drums.angle_max_deg,
            rate_max_deg_s: scenario
                .drums
                .rate_limit_deg_s
                .unwrap_or(reference.rate_limit()),
        },
    };

    // Reference gains follow the configured bank, not the reference one.
    let bank = drums.build()?;
    let controller = match (
        &scenario.controller,
        preset_controller(scenario.controller.kind(), &bank),
    ) {
        (
            ControllerDef::Pid {
                kp,
                ki,
                kd,
                derivative_filter_s,
                kaw,
            },
            ControllerConfig::Pid(mut g),
        ) => {
            g.kp = kp.unwrap_or(g.kp);
            g.ki = ki.unwrap_or(g.ki);
            g.kd = kd.unwrap_or(g.kd);
            g.derivative_filter_s = derivative_filter_s.unwrap_or(g.derivative_filter_s);
            g.kaw = kaw.unwrap_or(g.kaw);
            ControllerConfig::Pid(g)
        }
        (
            ControllerDef::SuperTwisting {
                k1,
                k2,
                surface_derivative_s,
                derivative_filter_s,
            },
            ControllerConfig::SuperTwisting(mut g),
        ) => {
            g.k1 = k1.unwrap_or(g.k1);
            g.k2 = k2.unwrap_or(g.k2);
            g.surface_derivative_s = surface_derivative_s.unwrap_or(g.surface_derivative_s);
            g.derivative_filter_s = derivative_filter_s.unwrap_or(g.derivative_filter_s);
            ControllerConfig::SuperTwisting(g)
        }
        (_, preset) => preset,
    };

    let config = SimConfig {
        controller,
        drums,
        dt_s: scenario.run.dt_s,
        horizon_s: scenario.run.horizon_s,
        demand: build_demand(&scenario.demand, scenario.drums.count)?,
        initial_power: scenario.run.initial_power,
        integrator: match scenario.run.integrator {
            IntegratorDef::Rk4 => IntegratorType::RK4,
            IntegratorDef::ForwardEuler => IntegratorType::ForwardEuler,
        },
        record_every: scenario.run.record_every,
    };
    config.validate()?;
    Ok(config)
}

fn build_demand(def: &DemandDef, drum_count: usize) -> ProjectResult<LoadDemand> {
    let demand = match def {
        DemandDef::Constant { power } => LoadDemand::constant(*power)?,
        DemandDef::Step { from, to, at_s } => LoadDemand::step(*from, *to, *at_s)?,
        DemandDef::Ramp {
            from,
            to,
            start_s,
            end_s,
        } => LoadDemand::ramp(*from, *to, *start_s, *end_s)?,
        DemandDef::MultiStep { initial, steps } => {
            let steps: Vec<(f64, f64)> = steps.iter().map(|s| (s.at_s, s.power)).collect();
            LoadDemand::multi_step(*initial, &steps)?
        }
        DemandDef::Points { points } => LoadDemand::new(
            points
                .iter()
                .map(|p| DemandPoint::new(p.time_s, p.power))
                .collect(),
        )?,
        DemandDef::Profile { name } => name.demand(drum_count)?,
    };
    Ok(demand)
}
