//! Closed-loop load-following simulation.
//!
//! Provides:
//! - Time-varying load demand ([`LoadDemand`])
//! - Validated run configuration ([`SimConfig`])
//! - The fixed-step driver coupling controller, drum bank and reactor ([`Simulation`])
//! - Per-step trace ([`SimulationTrace`]) and tracking metrics ([`RunMetrics`])
//! - Parallel sweeps over independent configurations

pub mod config;
pub mod demand;
pub mod driver;
pub mod error;
pub mod metrics;
pub mod sweep;
pub mod trace;

pub use config::{DrumConfig, SimConfig};
pub use demand::{DemandPoint, DemandProfile, LoadDemand};
pub use driver::{RunFailure, RunOutcome, Simulation};
pub use error::{SimError, SimResult};
pub use metrics::{DEFAULT_CHATTER_WINDOW_S, RunMetrics, chatter_amplitude, compute_metrics};
pub use sweep::{grid, run_sweep};
pub use trace::{SimulationTrace, TraceRecord};
