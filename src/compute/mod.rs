//! Compute module - Simulation state, stepping, and frame driving.

mod brush;
mod clock;
mod display;
mod driver;
mod field;
mod stepper;

pub mod gpu;

pub use brush::*;
pub use clock::*;
pub use display::*;
pub use driver::*;
pub use field::*;
pub use stepper::*;
