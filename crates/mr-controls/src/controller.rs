//! Controller interface shared by the simulation driver.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use crate::pid::{PidController, PidGains};
use crate::stc::{StcGains, SuperTwistingController};

/// What a controller sees at a sample instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub time_s: f64,
    /// Relative power (1.0 = nominal).
    pub power: f64,
    /// Demanded relative power.
    pub demand: f64,
}

impl Observation {
    /// Tracking error `power - demand`.
    pub fn error(&self) -> f64 {
        self.power - self.demand
    }
}

/// Controller output for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlAction {
    /// Command before the controller's output clamp (deg/s).
    pub command: f64,
    /// Command handed to the actuator (deg/s).
    pub rate: f64,
}

/// Internal memory, for tracing and inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerSnapshot {
    Pid {
        integral: f64,
        derivative: f64,
    },
    SuperTwisting {
        sliding: f64,
        u1: f64,
    },
}

/// A sampled drum-rate controller.
pub trait Controller {
    fn name(&self) -> &'static str;

    /// Produce a rate command and advance internal memory by `dt`.
    fn update(&mut self, obs: &Observation, dt: f64) -> ControlAction;

    /// Return to the initial (zero) memory.
    fn reset(&mut self);

    fn snapshot(&self) -> ControllerSnapshot;
}

impl Controller for PidController {
    fn name(&self) -> &'static str {
        "pid"
    }

    fn update(&mut self, obs: &Observation, dt: f64) -> ControlAction {
        // PID acts on demand - power
        let (command, rate) = self.advance(-obs.error(), dt);
        ControlAction { command, rate }
    }

    fn reset(&mut self) {
        self.clear();
    }

    fn snapshot(&self) -> ControllerSnapshot {
        let s = self.state();
        ControllerSnapshot::Pid {
            integral: s.integral,
            derivative: s.derivative,
        }
    }
}

impl Controller for SuperTwistingController {
    fn name(&self) -> &'static str {
        "super_twisting"
    }

    fn update(&mut self, obs: &Observation, dt: f64) -> ControlAction {
        let (command, rate) = self.advance(obs.error(), dt);
        ControlAction { command, rate }
    }

    fn reset(&mut self) {
        self.clear();
    }

    fn snapshot(&self) -> ControllerSnapshot {
        let s = self.state();
        ControllerSnapshot::SuperTwisting {
            sliding: s.sliding,
            u1: s.u1,
        }
    }
}

/// Closed set of controllers the driver can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum AnyController {
    Pid(PidController),
    SuperTwisting(SuperTwistingController),
}

impl Controller for AnyController {
    fn name(&self) -> &'static str {
        match self {
            AnyController::Pid(c) => c.name(),
            AnyController::SuperTwisting(c) => c.name(),
        }
    }

    fn update(&mut self, obs: &Observation, dt: f64) -> ControlAction {
        match self {
            AnyController::Pid(c) => c.update(obs, dt),
            AnyController::SuperTwisting(c) => c.update(obs, dt),
        }
    }

    fn reset(&mut self) {
        match self {
            AnyController::Pid(c) => c.reset(),
            AnyController::SuperTwisting(c) => c.reset(),
        }
    }

    fn snapshot(&self) -> ControllerSnapshot {
        match self {
            AnyController::Pid(c) => c.snapshot(),
            AnyController::SuperTwisting(c) => c.snapshot(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    Pid,
    SuperTwisting,
}

impl ControllerKind {
    pub const ALL: [ControllerKind; 2] = [ControllerKind::Pid, ControllerKind::SuperTwisting];
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerKind::Pid => f.write_str("pid"),
            ControllerKind::SuperTwisting => f.write_str("super_twisting"),
        }
    }
}

impl FromStr for ControllerKind {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pid" => Ok(ControllerKind::Pid),
            "stc" | "smc" | "super_twisting" | "super-twisting" => {
                Ok(ControllerKind::SuperTwisting)
            }
            other => Err(ControlError::InvalidConfig {
                what: format!("unknown controller '{other}'"),
            }),
        }
    }
}

/// Serializable controller selection with gains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerConfig {
    Pid(PidGains),
    SuperTwisting(StcGains),
}

impl ControllerConfig {
    pub fn kind(&self) -> ControllerKind {
        match self {
            ControllerConfig::Pid(_) => ControllerKind::Pid,
            ControllerConfig::SuperTwisting(_) => ControllerKind::SuperTwisting,
        }
    }

    pub fn validate(&self) -> ControlResult<()> {
        match self {
            ControllerConfig::Pid(g) => g.validate(),
            ControllerConfig::SuperTwisting(g) => g.validate(),
        }
    }

    /// Instantiate with fresh memory, clamping output to `rate_limit`.
    pub fn build(&self, rate_limit: f64) -> ControlResult<AnyController> {
        Ok(match self {
            ControllerConfig::Pid(g) => {
                AnyController::Pid(PidController::new(g.clone(), rate_limit)?)
            }
            ControllerConfig::SuperTwisting(g) => {
                AnyController::SuperTwisting(SuperTwistingController::new(g.clone(), rate_limit)?)
            }
        })
    }
}
