//! mr-core: shared foundation for the microreactor drum-control workspace.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::CoreError;
pub use numeric::*;
pub use units::*;
