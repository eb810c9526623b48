//! Scenario file schema.

use mr_controls::ControllerKind;
use mr_sim::DemandProfile;
use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub drums: DrumsDef,
    pub controller: ControllerDef,
    pub demand: DemandDef,
    pub run: RunDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DrumsDef {
    pub count: usize,
    /// Reference curve for `count` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worth: Option<WorthDef>,
    /// Reference slew limit for `count` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_deg_s: Option<f64>,
    #[serde(default = "default_angle_min")]
    pub angle_min_deg: f64,
    #[serde(default = "default_angle_max")]
    pub angle_max_deg: f64,
}

fn default_angle_min() -> f64 {
    0.0
}

fn default_angle_max() -> f64 {
    180.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum WorthDef {
    Sinusoidal {
        drum_worth: f64,
        critical_angle_deg: f64,
    },
    Linear {
        worth_per_deg: f64,
        critical_angle_deg: f64,
    },
}

/// Controller choice; any gain left out takes the reference value for the
/// configured drum count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ControllerDef {
    Pid {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kp: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ki: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kd: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        derivative_filter_s: Option<f64>,
        /// Back-calculation anti-windup gain; 0 or absent freezes the integral instead.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kaw: Option<f64>,
    },
    SuperTwisting {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        k1: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        k2: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        surface_derivative_s: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        derivative_filter_s: Option<f64>,
    },
}

impl ControllerDef {
    /// Reference gains only.
    pub fn reference(kind: ControllerKind) -> Self {
        match kind {
            ControllerKind::Pid => ControllerDef::Pid {
                kp: None,
                ki: None,
                kd: None,
                derivative_filter_s: None,
                kaw: None,
            },
            ControllerKind::SuperTwisting => ControllerDef::SuperTwisting {
                k1: None,
                k2: None,
                surface_derivative_s: None,
                derivative_filter_s: None,
            },
        }
    }

    pub fn kind(&self) -> ControllerKind {
        match self {
            ControllerDef::Pid { .. } => ControllerKind::Pid,
            ControllerDef::SuperTwisting { .. } => ControllerKind::SuperTwisting,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DemandDef {
    Constant {
        power: f64,
    },
    Step {
        from: f64,
        to: f64,
        at_s: f64,
    },
    Ramp {
        from: f64,
        to: f64,
        start_s: f64,
        end_s: f64,
    },
    MultiStep {
        initial: f64,
        steps: Vec<DemandStepDef>,
    },
    Points {
        points: Vec<DemandPointDef>,
    },
    Profile {
        name: DemandProfile,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DemandStepDef {
    pub at_s: f64,
    pub power: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DemandPointDef {
    pub time_s: f64,
    pub power: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorDef {
    #[default]
    Rk4,
    ForwardEuler,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunDef {
    pub dt_s: f64,
    pub horizon_s: f64,
    #[serde(default = "default_initial_power")]
    pub initial_power: f64,
    #[serde(default)]
    pub integrator: IntegratorDef,
    #[serde(default = "default_record_every")]
    pub record_every: usize,
}

fn default_initial_power() -> f64 {
    1.0
}

fn default_record_every() -> usize {
    1
}

impl Scenario {
    /// Reference hardware and gains for `kind`/`count` following `profile`,
    /// starting in equilibrium at the profile's first level.
    pub fn preset(kind: ControllerKind, count: usize, profile: DemandProfile) -> Self {
        let initial_power = profile
            .demand(count)
            .map(|d| d.initial())
            .unwrap_or_else(|_| default_initial_power());
        Self {
            version: LATEST_VERSION,
            name: format!("{kind} {count}-drum {}", profile_label(profile)),
            description: None,
            drums: DrumsDef {
                count,
                worth: None,
                rate_limit_deg_s: None,
                angle_min_deg: default_angle_min(),
                angle_max_deg: default_angle_max(),
            },
            controller: ControllerDef::reference(kind),
            demand: DemandDef::Profile { name: profile },
            run: RunDef {
                dt_s: 0.01,
                horizon_s: profile.suggested_horizon_s(),
                initial_power,
                integrator: IntegratorDef::default(),
                record_every: default_record_every(),
            },
        }
    }
}

fn profile_label(profile: DemandProfile) -> &'static str {
    match profile {
        DemandProfile::Constant => "constant",
        DemandProfile::Step => "step",
        DemandProfile::Ramp => "ramp",
        DemandProfile::MultiStep => "multi-step",
        DemandProfile::LoadFollow => "load-follow",
    }
}
