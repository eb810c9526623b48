//! Load demand profiles.
//!
//! A demand is a piecewise-linear function through `(time, power)`
//! breakpoints, held constant before the first and after the last. Two
//! breakpoints sharing a timestamp form a step that takes effect at that
//! instant.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemandPoint {
    pub time_s: f64,
    /// Relative power (1.0 = nominal)
    pub power: f64,
}

impl DemandPoint {
    pub fn new(time_s: f64, power: f64) -> Self {
        Self { time_s, power }
    }
}

/// Validated demand profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DemandPoint>", into = "Vec<DemandPoint>")]
pub struct LoadDemand {
    points: Vec<DemandPoint>,
}

impl LoadDemand {
    /// Build from breakpoints.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` if the list is empty, any value is not
    /// finite, a power is not positive, or timestamps decrease.
    pub fn new(points: Vec<DemandPoint>) -> SimResult<Self> {
        if points.is_empty() {
            return Err(SimError::Config("demand needs at least one point".into()));
        }
        for p in &points {
            if !(p.time_s.is_finite() && p.power.is_finite()) {
                return Err(SimError::Config(format!(
                    "demand point ({}, {}) is not finite",
                    p.time_s, p.power
                )));
            }
            if p.power <= 0.0 {
                return Err(SimError::Config(format!(
                    "demand power {} at t = {} s must be positive",
                    p.power, p.time_s
                )));
            }
        }
        if let Some(w) = points.windows(2).find(|w| w[1].time_s < w[0].time_s) {
            return Err(SimError::Config(format!(
                "demand times must be non-decreasing ({} s follows {} s)",
                w[1].time_s, w[0].time_s
            )));
        }
        Ok(Self { points })
    }

    pub fn constant(power: f64) -> SimResult<Self> {
        Self::new(vec![DemandPoint::new(0.0, power)])
    }

    /// `before` until `at_s`, `after` from then on.
    pub fn step(before: f64, after: f64, at_s: f64) -> SimResult<Self> {
        Self::new(vec![
            DemandPoint::new(at_s, before),
            DemandPoint::new(at_s, after),
        ])
    }

    /// Linear change from `from` at `start_s` to `to` at `end_s`.
    pub fn ramp(from: f64, to: f64, start_s: f64, end_s: f64) -> SimResult<Self> {
        if end_s < start_s {
            return Err(SimError::Config("ramp must end after it starts".into()));
        }
        Self::new(vec![
            DemandPoint::new(start_s, from),
            DemandPoint::new(end_s, to),
        ])
    }

    /// Starts at `initial`, stepping to each `(time, power)` in turn.
    pub fn multi_step(initial: f64, steps: &[(f64, f64)]) -> SimResult<Self> {
        let mut points = Vec::with_capacity(2 * steps.len() + 1);
        points.push(DemandPoint::new(0.0, initial));
        let mut level = initial;
        for &(t, p) in steps {
            points.push(DemandPoint::new(t, level));
            points.push(DemandPoint::new(t, p));
            level = p;
        }
        Self::new(points)
    }

    /// Reference load-follow cycle for a core with `drum_count` drums.
    ///
    /// Levels sit on a shared grid of knots (in units of 30 s) and are joined
    /// by ramps. Larger banks take deeper swings.
    pub fn load_follow(drum_count: usize) -> SimResult<Self> {
        const KNOTS: [f64; 10] = [0.0, 20.0, 30.0, 50.0, 60.0, 80.0, 90.0, 110.0, 130.0, 200.0];
        let levels: [f64; 10] = match drum_count {
            8 => [1.0, 1.0, 0.5, 0.5, 1.0, 1.0, 0.5, 0.5, 1.0, 1.0],
            4 => [0.3, 0.3, 1.0, 1.0, 0.6, 0.6, 0.8, 0.8, 1.0, 1.0],
            2 => [0.7, 0.7, 0.4, 0.4, 0.4, 0.8, 0.8, 0.8, 1.0, 1.0],
            1 => [0.9, 0.9, 0.7, 0.7, 0.5, 0.5, 0.7, 0.7, 1.0, 1.0],
            other => {
                return Err(SimError::Config(format!("no load-follow cycle for {other} drums")));
            }
        };
        Self::new(
            KNOTS
                .iter()
                .zip(levels)
                .map(|(k, p)| DemandPoint::new(30.0 * k, p))
                .collect(),
        )
    }

    pub fn points(&self) -> &[DemandPoint] {
        &self.points
    }

    /// Demanded power at `time_s`.
    pub fn at(&self, time_s: f64) -> f64 {
        let idx = self.points.partition_point(|p| p.time_s <= time_s);
        if idx == 0 {
            return self.points[0].power;
        }
        if idx == self.points.len() {
            return self.points[idx - 1].power;
        }
        let a = self.points[idx - 1];
        let b = self.points[idx];
        // a.time_s <= time_s < b.time_s, so the span is positive
        let frac = (time_s - a.time_s) / (b.time_s - a.time_s);
        a.power + frac * (b.power - a.power)
    }

    pub fn initial(&self) -> f64 {
        self.points[0].power
    }

    pub fn final_power(&self) -> f64 {
        self.points[self.points.len() - 1].power
    }

    /// Time of the last breakpoint.
    pub fn last_change_s(&self) -> f64 {
        self.points[self.points.len() - 1].time_s
    }

    pub fn min_power(&self) -> f64 {
        self.points.iter().map(|p| p.power).fold(f64::INFINITY, f64::min)
    }

    pub fn max_power(&self) -> f64 {
        self.points
            .iter()
            .map(|p| p.power)
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

impl TryFrom<Vec<DemandPoint>> for LoadDemand {
    type Error = SimError;

    fn try_from(points: Vec<DemandPoint>) -> SimResult<Self> {
        Self::new(points)
    }
}

impl From<LoadDemand> for Vec<DemandPoint> {
    fn from(demand: LoadDemand) -> Self {
        demand.points
    }
}

/// Named reference profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandProfile {
    /// Hold 1.0.
    Constant,
    /// 1.0 -> 1.1 at 10 s.
    Step,
    /// 1.0 -> 0.9 between 10 s and 60 s.
    Ramp,
    /// 1.05 at 10 s, 0.95 at 80 s, 1.0 at 150 s.
    MultiStep,
    /// Daily load-follow cycle over 6000 s with 300 s ramps; the levels
    /// depend on the drum count (see [`LoadDemand::load_follow`]).
    LoadFollow,
}

impl DemandProfile {
    pub const ALL: [DemandProfile; 5] = [
        DemandProfile::Constant,
        DemandProfile::Step,
        DemandProfile::Ramp,
        DemandProfile::MultiStep,
        DemandProfile::LoadFollow,
    ];

    /// The profile for a bank of `drum_count` drums.
    pub fn demand(self, drum_count: usize) -> SimResult<LoadDemand> {
        match self {
            DemandProfile::Constant => LoadDemand::constant(1.0),
            DemandProfile::Step => LoadDemand::step(1.0, 1.1, 10.0),
            DemandProfile::Ramp => LoadDemand::ramp(1.0, 0.9, 10.0, 60.0),
            DemandProfile::MultiStep => {
                LoadDemand::multi_step(1.0, &[(10.0, 1.05), (80.0, 0.95), (150.0, 1.0)])
            }
            DemandProfile::LoadFollow => LoadDemand::load_follow(drum_count),
        }
    }

    /// Horizon long enough to see the profile settle.
    pub fn suggested_horizon_s(self) -> f64 {
        match self {
            DemandProfile::Constant => 100.0,
            DemandProfile::Step | DemandProfile::Ramp => 300.0,
            DemandProfile::MultiStep => 400.0,
            DemandProfile::LoadFollow => 6000.0,
        }
    }
}

impl std::str::FromStr for DemandProfile {
    type Err = SimError;

    fn from_str(s: &str) -> SimResult<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "constant" => Ok(DemandProfile::Constant),
            "step" => Ok(DemandProfile::Step),
            "ramp" => Ok(DemandProfile::Ramp),
            "multi_step" => Ok(DemandProfile::MultiStep),
            "load_follow" => Ok(DemandProfile::LoadFollow),
            other => Err(SimError::Config(format!("unknown demand profile '{other}'"))),
        }
    }
}
