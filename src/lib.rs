//! Gray-Scott reaction-diffusion on the GPU.
//!
//! This crate simulates the two-species Gray-Scott model with a ping-pong
//! pair of floating-point render targets, advanced by repeated fragment
//! passes and mapped to the screen through a piecewise color ramp. A CPU
//! reference path implements the same update rule for headless runs and
//! tests.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, color ramp, presets, and field seeding
//! - `compute`: Field buffers, step program, frame driver, and the GPU
//!   pipeline (`compute::gpu`)
//!
//! The host owns the window/surface and the frame scheduler; it calls
//! `on_frame(timestamp_ms)` once per vertical sync and forwards pointer
//! events. The core is otherwise a pure state machine.
//!
//! # Example
//!
//! ```rust,no_run
//! use gray_scott::{
//!     compute::CpuSimulation,
//!     schema::{Seed, SimulationConfig},
//! };
//!
//! let config = SimulationConfig::default();
//! let mut sim = CpuSimulation::new(config, Seed::default()).unwrap();
//!
//! // One displayed frame: 8 sub-steps, then the display pass.
//! let mut pixels = Vec::new();
//! sim.on_frame(16.7, &mut pixels);
//!
//! println!("non-finite cells: {}", sim.stats().non_finite);
//! ```

pub mod compute;
pub mod schema;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use compute::{Brush, CpuSimulation, Field, FieldPair, FieldStats, FrameClock};
pub use compute::gpu::{GpuContext, GpuError, GpuRenderer};
pub use schema::{ColorRamp, ColorStop, Pattern, Seed, SimulationConfig};
