//! Reactor plant model for microreactor load-following studies.
//!
//! Provides:
//! - Point kinetics with six delayed-neutron precursor groups
//! - Two-node (fuel, moderator) thermal model with temperature feedback
//! - Fixed-step RK4 and forward Euler integrators over a generic model trait
//! - `Reactor::step`, a pure state-advance function for the closed loop

pub mod error;
pub mod integrator;
pub mod kinetics;
pub mod model;
pub mod reactor;
pub mod state;
pub mod thermal;

pub use error::{PlantError, PlantResult};
pub use integrator::{ForwardEuler, Integrator, IntegratorType, RK4};
pub use kinetics::{KineticsParams, NUM_GROUPS};
pub use model::TransientModel;
pub use reactor::{Reactor, ReactorParams};
pub use state::{PlantState, STATE_DIM, StateVector};
pub use thermal::{ThermalDesign, ThermalParams};
