//! Scenario validation.
//!
//! Structural checks with field names in the messages. Physical consistency
//! (e.g. a critical angle inside the travel limits) is checked again when the
//! scenario is turned into a run configuration.

use mr_controls::SUPPORTED_DRUM_COUNTS;

use crate::schema::{
    ControllerDef, DemandDef, DemandPointDef, LATEST_VERSION, RunDef, Scenario, WorthDef,
};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, v: f64) -> Result<(), ValidationError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, v, "must be positive and finite"))
    }
}

fn non_negative(field: &str, v: Option<f64>) -> Result<(), ValidationError> {
    match v {
        Some(v) if !(v.is_finite() && v >= 0.0) => {
            Err(invalid(field, v, "must be non-negative and finite"))
        }
        _ => Ok(()),
    }
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(invalid("name", "\"\"", "must not be empty"));
    }

    let drums = &scenario.drums;
    if !SUPPORTED_DRUM_COUNTS.contains(&drums.count) {
        return Err(ValidationError::Unsupported {
            feature: format!("drums.count = {}", drums.count),
            reason: "supported drum counts are 1, 2, 4 and 8".to_string(),
        });
    }
    if !(drums.angle_min_deg.is_finite()
        && drums.angle_max_deg.is_finite()
        && drums.angle_min_deg < drums.angle_max_deg)
    {
        return Err(invalid(
            "drums.angle_min_deg",
            drums.angle_min_deg,
            "must be finite and below drums.angle_max_deg",
        ));
    }
    if let Some(rate) = drums.rate_limit_deg_s {
        positive("drums.rate_limit_deg_s", rate)?;
    }
    match &drums.worth {
        Some(WorthDef::Sinusoidal { drum_worth, .. }) => {
            positive("drums.worth.drum_worth", *drum_worth)?
        }
        Some(WorthDef::Linear { worth_per_deg, .. }) => {
            positive("drums.worth.worth_per_deg", *worth_per_deg)?
        }
        None => {}
    }

    validate_controller(&scenario.controller)?;
    validate_demand(&scenario.demand)?;
    validate_run(&scenario.run)?;
    Ok(())
}

fn validate_controller(def: &ControllerDef) -> Result<(), ValidationError> {
    match def {
        ControllerDef::Pid {
            kp,
            ki,
            kd,
            derivative_filter_s,
            kaw,
        } => {
            non_negative("controller.kp", *kp)?;
            non_negative("controller.ki", *ki)?;
            non_negative("controller.kd", *kd)?;
            non_negative("controller.derivative_filter_s", *derivative_filter_s)?;
            non_negative("controller.kaw", *kaw)?;
        }
        ControllerDef::SuperTwisting {
            k1,
            k2,
            surface_derivative_s,
            derivative_filter_s,
        } => {
            non_negative("controller.k1", *k1)?;
            non_negative("controller.k2", *k2)?;
            non_negative("controller.surface_derivative_s", *surface_derivative_s)?;
            non_negative("controller.derivative_filter_s", *derivative_filter_s)?;
        }
    }
    Ok(())
}

fn validate_points(points: &[DemandPointDef]) -> Result<(), ValidationError> {
    if points.is_empty() {
        return Err(invalid("demand.points", "[]", "needs at least one point"));
    }
    for (i, p) in points.iter().enumerate() {
        if !p.time_s.is_finite() {
            let field = format!("demand.points[{i}].time_s");
            return Err(invalid(&field, p.time_s, "must be finite"));
        }
        positive(&format!("demand.points[{i}].power"), p.power)?;
        if i > 0 && p.time_s < points[i - 1].time_s {
            return Err(invalid(
                &format!("demand.points[{i}].time_s"),
                p.time_s,
                "times must be non-decreasing",
            ));
        }
    }
    Ok(())
}

fn validate_demand(def: &DemandDef) -> Result<(), ValidationError> {
    match def {
        DemandDef::Constant { power } => positive("demand.power", *power),
        DemandDef::Step { from, to, at_s } => {
            positive("demand.from", *from)?;
            positive("demand.to", *to)?;
            if !at_s.is_finite() {
                return Err(invalid("demand.at_s", at_s, "must be finite"));
            }
            Ok(())
        }
        DemandDef::Ramp {
            from,
            to,
            start_s,
            end_s,
        } => {
            positive("demand.from", *from)?;
            positive("demand.to", *to)?;
            if !(start_s.is_finite() && end_s.is_finite() && start_s <= end_s) {
                return Err(invalid(
                    "demand.end_s",
                    end_s,
                    "ramp times must be finite with end_s >= start_s",
                ));
            }
            Ok(())
        }
        DemandDef::MultiStep { initial, steps } => {
            positive("demand.initial", *initial)?;
            let points: Vec<DemandPointDef> = steps
                .iter()
                .map(|s| DemandPointDef {
                    time_s: s.at_s,
                    power: s.power,
                })
                .collect();
            if points.is_empty() {
                Ok(())
            } else {
                validate_points(&points)
            }
        }
        DemandDef::Points { points } => validate_points(points),
        DemandDef::Profile { .. } => Ok(()),
    }
}

fn validate_run(run: &RunDef) -> Result<(), ValidationError> {
    positive("run.dt_s", run.dt_s)?;
    if run.dt_s > mr_sim::config::MAX_DT_S {
        return Err(invalid("run.dt_s", run.dt_s, "must not exceed 0.1 s"));
    }
    positive("run.horizon_s", run.horizon_s)?;
    positive("run.initial_power", run.initial_power)?;
    if run.record_every == 0 {
        return Err(invalid("run.record_every", 0, "must be at least 1"));
    }
    Ok(())
}
