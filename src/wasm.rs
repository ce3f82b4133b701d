//! WebAssembly bindings for the Gray-Scott simulation.
//!
//! Provides thin wrappers around `CpuSimulation` for browser environments:
//! the page drives `onFrame` from `requestAnimationFrame`, forwards pointer
//! events, and blits the returned pixels into a canvas `ImageData`.

use wasm_bindgen::prelude::*;

use crate::compute::CpuSimulation;
use crate::schema::{ColorRamp, Seed, SimulationConfig};

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

/// WebAssembly wrapper for the Gray-Scott frame driver.
#[wasm_bindgen]
pub struct WasmSimulation {
    sim: CpuSimulation,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl WasmSimulation {
    /// Create a new simulation from JSON configuration.
    ///
    /// # Arguments
    /// * `config_json` - JSON string containing SimulationConfig
    /// * `seed_json` - JSON string containing Seed
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, seed_json: &str) -> Result<WasmSimulation, JsValue> {
        let config: SimulationConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))?;

        let seed: Seed = serde_json::from_str(seed_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid seed JSON: {e}")))?;

        let sim = CpuSimulation::new(config, seed)
            .map_err(|e| JsValue::from_str(&format!("Invalid configuration: {e}")))?;

        Ok(WasmSimulation {
            sim,
            pixels: Vec::new(),
        })
    }

    /// Run one displayed frame and refresh the pixel buffer.
    #[wasm_bindgen(js_name = onFrame)]
    pub fn on_frame(&mut self, timestamp_ms: f64) {
        let mut pixels = std::mem::take(&mut self.pixels);
        self.sim.on_frame(timestamp_ms, &mut pixels);
        self.pixels = pixels;
    }

    /// The last rendered frame as RGBA bytes, sized width*height*4.
    #[wasm_bindgen]
    pub fn pixels(&self) -> js_sys::Uint8ClampedArray {
        js_sys::Uint8ClampedArray::from(&self.pixels[..])
    }

    /// Record the canvas size used to normalize pointer coordinates.
    #[wasm_bindgen(js_name = setViewport)]
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.sim.set_viewport(width, height);
    }

    #[wasm_bindgen(js_name = onPointerDown)]
    pub fn on_pointer_down(&mut self, x: f32, y: f32) {
        self.sim.on_pointer_down(x, y);
    }

    #[wasm_bindgen(js_name = onPointerMove)]
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.sim.on_pointer_move(x, y);
    }

    #[wasm_bindgen(js_name = onPointerUp)]
    pub fn on_pointer_up(&mut self) {
        self.sim.on_pointer_up();
    }

    /// Update feed/kill rates.
    #[wasm_bindgen(js_name = setFeedKill)]
    pub fn set_feed_kill(&mut self, feed: f32, kill: f32) {
        self.sim.set_feed_kill(feed, kill);
    }

    /// Apply a preset by index; returns false for an unknown index.
    #[wasm_bindgen(js_name = applyPreset)]
    pub fn apply_preset(&mut self, index: usize) -> bool {
        self.sim.apply_preset(index)
    }

    /// Replace the display color ramp from JSON stops.
    #[wasm_bindgen(js_name = setColorRamp)]
    pub fn set_color_ramp(&mut self, ramp_json: &str) -> Result<(), JsValue> {
        let ramp: ColorRamp = serde_json::from_str(ramp_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid ramp JSON: {e}")))?;
        self.sim
            .set_color_ramp(ramp)
            .map_err(|e| JsValue::from_str(&format!("Invalid ramp: {e}")))
    }

    /// Re-seed the field, preserving feed/kill unless new values are given.
    #[wasm_bindgen]
    pub fn reset(&mut self, feed: Option<f32>, kill: Option<f32>) {
        self.sim.reset(feed, kill);
    }

    /// Change the grid resolution.
    #[wasm_bindgen]
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), JsValue> {
        self.sim
            .resize(width, height)
            .map_err(|e| JsValue::from_str(&format!("Invalid size: {e}")))
    }

    /// Get field statistics as a JS object.
    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.sim.stats())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    #[wasm_bindgen(js_name = getWidth)]
    pub fn get_width(&self) -> usize {
        self.sim.config().width
    }

    #[wasm_bindgen(js_name = getHeight)]
    pub fn get_height(&self) -> usize {
        self.sim.config().height
    }

    /// Frames completed since creation.
    #[wasm_bindgen(js_name = getFrame)]
    pub fn get_frame(&self) -> u64 {
        self.sim.frame()
    }
}
