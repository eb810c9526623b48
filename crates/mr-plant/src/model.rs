//! TransientModel trait for pluggable dynamic systems.

use crate::error::PlantResult;

/// An autonomous system `dx/dt = f(x)` the integrators can advance.
///
/// Inputs that vary in time (the drum reactivity) are held by the model for
/// the length of one step.
pub trait TransientModel {
    /// State type (must be Clone).
    type State: Clone;

    /// State derivative at `x`.
    fn rhs(&self, x: &Self::State) -> PlantResult<Self::State>;

    /// Add two states element-wise: result = a + b.
    fn add(&self, a: &Self::State, b: &Self::State) -> Self::State;

    /// Scale a state by a scalar: result = scale * a.
    fn scale(&self, a: &Self::State, scale: f64) -> Self::State;
}
