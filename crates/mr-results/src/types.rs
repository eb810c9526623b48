//! Result data types.

use mr_controls::ControllerKind;
use mr_sim::{RunMetrics, RunOutcome, SimConfig};
use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_name: String,
    pub timestamp: String,
    pub solver_version: String,
    pub controller: ControllerKind,
    pub drum_count: usize,
    pub dt_s: f64,
    pub horizon_s: f64,
    pub samples: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<RunMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureSummary {
    pub step: usize,
    pub time_s: f64,
    pub message: String,
}

impl RunManifest {
    /// Manifest for `outcome`, stamped with the current UTC time.
    pub fn new(
        run_id: RunId,
        scenario_name: &str,
        config: &SimConfig,
        outcome: &RunOutcome,
        metrics: Option<RunMetrics>,
    ) -> Self {
        Self {
            run_id,
            scenario_name: scenario_name.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            solver_version: crate::SOLVER_VERSION.to_string(),
            controller: config.controller.kind(),
            drum_count: config.drums.count,
            dt_s: config.dt_s,
            horizon_s: config.horizon_s,
            samples: outcome.trace.len(),
            failure: outcome.failure.as_ref().map(|f| FailureSummary {
                step: f.step,
                time_s: f.time_s,
                message: f.error.to_string(),
            }),
            metrics,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}
