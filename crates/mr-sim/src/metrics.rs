//! Tracking performance metrics.
//!
//! Computes error integrals, settling behaviour, actuator usage and residual
//! chattering from a [`SimulationTrace`]. Error is `demand - power`.

use mr_controls::ControllerSnapshot;
use mr_core::trapezoid;
use serde::{Deserialize, Serialize};

use crate::trace::{SimulationTrace, TraceRecord};

/// Trailing window (seconds) for [`chatter_amplitude`].
pub const DEFAULT_CHATTER_WINDOW_S: f64 = 50.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Mean absolute error over all samples
    pub mae: f64,
    /// ∫|e| dt
    pub iae: f64,
    /// ∫t|e| dt
    pub itae: f64,
    /// ∫e² dt
    pub ise: f64,
    /// ∫t e² dt
    pub itse: f64,
    pub max_abs_error: f64,
    /// sqrt(∫ rate² dt) of the drum speed (deg/s·√s)
    pub control_effort: f64,
    /// Time after which power stays within ±2% of the final demand
    pub settling_time_2pct_s: Option<f64>,
    /// Same with a ±1% band
    pub settling_time_1pct_s: Option<f64>,
    /// Peak excursion past the final demand, in percent of the demand change
    pub overshoot_pct: Option<f64>,
    /// Final `demand - power`
    pub steady_state_error: f64,
    /// Fraction of steps with the slew limit active
    pub rate_saturation_fraction: f64,
    /// Fraction of steps with a travel limit active
    pub angle_saturation_fraction: f64,
    /// Peak |s| over the trailing window
    pub chatter_amplitude: f64,
}

/// Compute all metrics; an empty trace gives the default (all zero).
pub fn compute_metrics(trace: &SimulationTrace, chatter_window_s: f64) -> RunMetrics {
    let records = trace.records();
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return RunMetrics::default();
    };

    let t = trace.times();
    let abs_e: Vec<f64> = records.iter().map(|r| r.error.abs()).collect();
    let sq_e: Vec<f64> = records.iter().map(|r| r.error * r.error).collect();
    let t_abs_e: Vec<f64> = t.iter().zip(&abs_e).map(|(t, e)| t * e).collect();
    let t_sq_e: Vec<f64> = t.iter().zip(&sq_e).map(|(t, e)| t * e).collect();
    let sq_rate: Vec<f64> = records
        .iter()
        .map(|r| r.drum.rate_deg_s * r.drum.rate_deg_s)
        .collect();

    // The initial sample carries no actuation.
    let steps = records.len().saturating_sub(1).max(1) as f64;
    let rate_sat = records.iter().skip(1).filter(|r| r.rate_saturated).count() as f64;
    let angle_sat = records.iter().skip(1).filter(|r| r.angle_saturated).count() as f64;

    RunMetrics {
        mae: abs_e.iter().sum::<f64>() / records.len() as f64,
        iae: trapezoid(&t, &abs_e),
        itae: trapezoid(&t, &t_abs_e),
        ise: trapezoid(&t, &sq_e),
        itse: trapezoid(&t, &t_sq_e),
        max_abs_error: abs_e.iter().copied().fold(0.0, f64::max),
        control_effort: trapezoid(&t, &sq_rate).sqrt(),
        settling_time_2pct_s: settling_time(records, last.demand, 0.02),
        settling_time_1pct_s: settling_time(records, last.demand, 0.01),
        overshoot_pct: overshoot_pct(records, first.demand, last.demand),
        steady_state_error: last.error,
        rate_saturation_fraction: rate_sat / steps,
        angle_saturation_fraction: angle_sat / steps,
        chatter_amplitude: chatter_amplitude(trace, chatter_window_s),
    }
}

/// Largest |s| over the last `window_s` seconds.
///
/// `s` is the super-twisting sliding variable when recorded, otherwise the
/// tracking error `power - demand`.
pub fn chatter_amplitude(trace: &SimulationTrace, window_s: f64) -> f64 {
    let Some(last) = trace.last() else {
        return 0.0;
    };
    trace
        .since(last.time_s - window_s)
        .iter()
        .map(|r| match r.controller {
            ControllerSnapshot::SuperTwisting { sliding, .. } => sliding.abs(),
            ControllerSnapshot::Pid { .. } => r.error.abs(),
        })
        .fold(0.0, f64::max)
}

/// First time after which |power - target| stays within `band * |target|`.
fn settling_time(records: &[TraceRecord], target: f64, band: f64) -> Option<f64> {
    let tol = band * target.abs();
    let outside = |r: &TraceRecord| (r.plant.power - target).abs() > tol;
    match records.iter().rposition(outside) {
        None => records.first().map(|r| r.time_s),
        Some(i) if i + 1 < records.len() => Some(records[i + 1].time_s),
        Some(_) => None,
    }
}

fn overshoot_pct(records: &[TraceRecord], initial: f64, target: f64) -> Option<f64> {
    let change = target - initial;
    if change.abs() < 1e-9 {
        return None;
    }
    let direction = change.signum();
    let peak = records
        .iter()
        .map(|r| direction * (r.plant.power - target))
        .fold(f64::NEG_INFINITY, f64::max);
    Some((peak.max(0.0) / change.abs()) * 100.0)
}
