//! Piecewise-linear color ramp for the display pass.

use serde::{Deserialize, Serialize};

use super::config::ConfigError;

/// Maximum number of stops the display program accepts.
pub const MAX_COLOR_STOPS: usize = 5;

/// A single ramp stop: a threshold in [0, 1] and the RGBA color shown there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub threshold: f32,
    pub color: [f32; 4],
}

/// Ordered sequence of color stops, ascending by threshold.
///
/// Sampling is a pure function: concentrations below the first stop take the
/// first color, above the last stop the last color, and anything in between
/// is linearly interpolated between the two bracketing stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRamp {
    pub stops: Vec<ColorStop>,
}

impl Default for ColorRamp {
    /// The gradient the original ships with: black through green, yellow and
    /// red to white.
    fn default() -> Self {
        Self {
            stops: vec![
                ColorStop {
                    threshold: 0.0,
                    color: [0.0, 0.0, 0.0, 1.0],
                },
                ColorStop {
                    threshold: 0.2,
                    color: [0.0, 1.0, 0.0, 1.0],
                },
                ColorStop {
                    threshold: 0.21,
                    color: [1.0, 1.0, 0.0, 1.0],
                },
                ColorStop {
                    threshold: 0.4,
                    color: [1.0, 0.0, 0.0, 1.0],
                },
                ColorStop {
                    threshold: 0.6,
                    color: [1.0, 1.0, 1.0, 1.0],
                },
            ],
        }
    }
}

impl ColorRamp {
    /// Validate stop count, range, and ordering.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stops.is_empty() {
            return Err(ConfigError::EmptyRamp);
        }
        if self.stops.len() > MAX_COLOR_STOPS {
            return Err(ConfigError::TooManyStops(self.stops.len()));
        }
        for pair in self.stops.windows(2) {
            if !(pair[0].threshold < pair[1].threshold) {
                return Err(ConfigError::InvalidStops);
            }
        }
        for stop in &self.stops {
            if !(0.0..=1.0).contains(&stop.threshold) {
                return Err(ConfigError::InvalidStops);
            }
        }
        Ok(())
    }

    /// Map a concentration to an RGBA color.
    pub fn sample(&self, value: f32) -> [f32; 4] {
        let first = &self.stops[0];
        if value <= first.threshold {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            if value < hi.threshold {
                let t = (value - lo.threshold) / (hi.threshold - lo.threshold);
                return lerp_rgba(lo.color, hi.color, t);
            }
        }
        self.stops[self.stops.len() - 1].color
    }
}

fn lerp_rgba(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
        a[3] + (b[3] - a[3]) * t,
    ]
}
