//! Schema module - Configuration, color ramp, presets, and seeding types.

mod config;
mod preset;
mod ramp;
mod seed;

pub use config::*;
pub use preset::*;
pub use ramp::*;
pub use seed::*;
