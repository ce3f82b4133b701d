//! Frame driver (CPU path) - sub-step batching, input, and configuration.

use log::{debug, info};

use super::brush::{BRUSH_SENTINEL, Brush};
use super::clock::FrameClock;
use super::display::render_rgba;
use super::field::{Field, FieldPair, FieldStats};
use super::stepper::{StepParams, step_pair};
use crate::schema::{ColorRamp, ConfigError, Seed, SimulationConfig, preset};

/// Pointer tracking for brush input, in canvas pixel coordinates.
#[derive(Debug, Clone, Copy)]
struct PointerState {
    viewport: (f32, f32),
    down: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            viewport: (1.0, 1.0),
            down: false,
        }
    }
}

/// CPU simulation session: double-buffered field, step batching, brush, and
/// runtime configuration.
///
/// The host drives it with `on_frame(timestamp_ms)` once per displayed frame
/// and forwards pointer events; everything else is explicit state.
pub struct CpuSimulation {
    config: SimulationConfig,
    seed: Seed,
    fields: FieldPair,
    clock: FrameClock,
    brush: Brush,
    pointer: PointerState,
    frame: u64,
}

impl CpuSimulation {
    /// Validate the configuration and allocate both field buffers.
    pub fn new(config: SimulationConfig, seed: Seed) -> Result<Self, ConfigError> {
        config.validate()?;
        let fields = FieldPair::from_seed(&seed, config.width, config.height);

        info!(
            "simulation ready: {}x{} grid, {} sub-steps/frame",
            config.width, config.height, config.substeps
        );

        Ok(Self {
            config,
            seed,
            fields,
            clock: FrameClock::default(),
            brush: Brush::default(),
            pointer: PointerState::default(),
            frame: 0,
        })
    }

    /// Run one frame's batch of sub-steps.
    ///
    /// The pending brush (if any) is applied to the first sub-step only and
    /// cleared; the remaining sub-steps see the sentinel.
    pub fn advance(&mut self, timestamp_ms: f64) {
        let delta = self.clock.delta(timestamp_ms);
        let params = StepParams::from_config(&self.config, delta);

        for substep in 0..self.config.substeps {
            let brush = if substep == 0 {
                self.brush.take()
            } else {
                BRUSH_SENTINEL
            };
            step_pair(&mut self.fields, &params, brush);
        }

        self.frame += 1;
    }

    /// Display pass: map the current field into an RGBA8 buffer.
    pub fn render_into(&self, out: &mut Vec<u8>) {
        render_rgba(self.fields.source(), &self.config.ramp, self.config.display, out);
    }

    /// Full frame: sub-step batch followed by the display pass.
    pub fn on_frame(&mut self, timestamp_ms: f64, out: &mut Vec<u8>) {
        self.advance(timestamp_ms);
        self.render_into(out);
    }

    /// Record the canvas size used to normalize pointer coordinates.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.pointer.viewport = (width.max(1.0), height.max(1.0));
    }

    /// Pointer pressed at canvas pixel (x, y).
    pub fn on_pointer_down(&mut self, x: f32, y: f32) {
        self.pointer.down = true;
        self.issue_brush(x, y);
    }

    /// Pointer moved; paints only while the button is held.
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        if self.pointer.down {
            self.issue_brush(x, y);
        }
    }

    /// Pointer released.
    pub fn on_pointer_up(&mut self) {
        self.pointer.down = false;
    }

    fn issue_brush(&mut self, x: f32, y: f32) {
        let (vw, vh) = self.pointer.viewport;
        self.brush.set(x / vw, y / vh);
    }

    /// Update feed/kill rates; takes effect from the next sub-step.
    pub fn set_feed_kill(&mut self, feed: f32, kill: f32) {
        self.config.feed = feed;
        self.config.kill = kill;
    }

    /// Replace the display color ramp.
    pub fn set_color_ramp(&mut self, ramp: ColorRamp) -> Result<(), ConfigError> {
        ramp.validate()?;
        self.config.ramp = ramp;
        Ok(())
    }

    /// Apply a preset's (feed, kill) pair by index.
    pub fn apply_preset(&mut self, index: usize) -> bool {
        match preset(index) {
            Some(p) => {
                debug!("preset {}: {}", index, p.name);
                self.set_feed_kill(p.feed, p.kill);
                true
            }
            None => false,
        }
    }

    /// Re-seed both field buffers as one atomic transition, preserving the
    /// current feed/kill unless new values are supplied.
    pub fn reset(&mut self, feed: Option<f32>, kill: Option<f32>) {
        if let Some(f) = feed {
            self.config.feed = f;
        }
        if let Some(k) = kill {
            self.config.kill = k;
        }
        self.fields = FieldPair::from_seed(&self.seed, self.config.width, self.config.height);
        self.clock.reset();
        self.brush.clear();
        debug!(
            "reset: feed={}, kill={}",
            self.config.feed, self.config.kill
        );
    }

    /// Change the grid resolution, disposing and recreating both buffers.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), ConfigError> {
        let mut config = self.config.clone();
        config.width = width;
        config.height = height;
        config.validate()?;

        self.config = config;
        self.fields = FieldPair::from_seed(&self.seed, width, height);
        self.clock.reset();
        self.brush.clear();
        debug!("resized to {}x{}", width, height);
        Ok(())
    }

    /// The field the next sub-step will read (and the display pass shows).
    pub fn field(&self) -> &Field {
        self.fields.source()
    }

    /// Statistics over the current field.
    pub fn stats(&self) -> FieldStats {
        self.fields.source().stats()
    }

    /// Get configuration reference.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Frames completed since creation or reset.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The brush injector (pending coordinate, if any).
    pub fn brush(&self) -> &Brush {
        &self.brush
    }
}
