//! Simulation trace.

use mr_controls::{ControllerSnapshot, DrumState};
use mr_plant::PlantState;
use serde::{Deserialize, Serialize};

/// One recorded sample. The command is the one applied over the step that
/// ended at `time_s` (zero for the initial sample).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub step: usize,
    pub time_s: f64,
    pub demand: f64,
    pub plant: PlantState,
    pub drum: DrumState,
    pub rho_drum: f64,
    pub rho_feedback: f64,
    pub rho_total: f64,
    /// `demand - power`
    pub error: f64,
    /// Raw controller command (deg/s)
    pub command: f64,
    pub rate_saturated: bool,
    pub angle_saturated: bool,
    pub controller: ControllerSnapshot,
}

/// Ordered, append-only list of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationTrace {
    records: Vec<TraceRecord>,
}

impl SimulationTrace {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            records: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, record: TraceRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&TraceRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&TraceRecord> {
        self.records.last()
    }

    pub fn times(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.time_s).collect()
    }

    pub fn powers(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.plant.power).collect()
    }

    /// Records with `time_s >= t`.
    pub fn since(&self, t: f64) -> &[TraceRecord] {
        let idx = self.records.partition_point(|r| r.time_s < t);
        &self.records[idx..]
    }
}

impl<'a> IntoIterator for &'a SimulationTrace {
    type Item = &'a TraceRecord;
    type IntoIter = std::slice::Iter<'a, TraceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<TraceRecord> for SimulationTrace {
    fn from_iter<I: IntoIterator<Item = TraceRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
