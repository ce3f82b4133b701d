//! Configuration types for the Gray-Scott simulation.

use serde::{Deserialize, Serialize};

use super::preset::PRESETS;
use super::ramp::ColorRamp;

fn default_substeps() -> u32 {
    8
}

fn default_diffusion_u() -> f32 {
    1.0
}

fn default_diffusion_v() -> f32 {
    0.5
}

/// Which species the display pass maps through the color ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayChannel {
    /// Substrate concentration.
    U,
    /// Activator concentration (the original renders this one).
    #[default]
    V,
}

/// Top-level simulation configuration.
///
/// Feed and kill are deliberately not clamped to (0, 1): the system is
/// numerically unstable outside physically meaningful ranges, and keeping
/// them open is part of the contract (see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Euler sub-steps per displayed frame.
    #[serde(default = "default_substeps")]
    pub substeps: u32,
    /// Feed rate f.
    pub feed: f32,
    /// Kill rate k.
    pub kill: f32,
    /// Diffusion rate for u, in stencil units.
    #[serde(default = "default_diffusion_u")]
    pub diffusion_u: f32,
    /// Diffusion rate for v, in stencil units.
    #[serde(default = "default_diffusion_v")]
    pub diffusion_v: f32,
    /// Species shown by the display pass.
    #[serde(default)]
    pub display: DisplayChannel,
    /// Color ramp used by the display pass.
    #[serde(default)]
    pub ramp: ColorRamp,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            substeps: default_substeps(),
            feed: PRESETS[0].feed,
            kill: PRESETS[0].kill,
            diffusion_u: default_diffusion_u(),
            diffusion_v: default_diffusion_v(),
            display: DisplayChannel::default(),
            ramp: ColorRamp::default(),
        }
    }
}

impl SimulationConfig {
    /// Get total grid size (width * height).
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.width * self.height
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.substeps == 0 {
            return Err(ConfigError::InvalidSubsteps);
        }
        if !self.feed.is_finite() || !self.kill.is_finite() {
            return Err(ConfigError::NonFiniteRates);
        }
        if !(self.diffusion_u >= 0.0 && self.diffusion_u.is_finite())
            || !(self.diffusion_v >= 0.0 && self.diffusion_v.is_finite())
        {
            return Err(ConfigError::InvalidDiffusion);
        }
        self.ramp.validate()
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid dimensions (width, height) must be non-zero")]
    InvalidDimensions,
    #[error("Sub-step count must be non-zero")]
    InvalidSubsteps,
    #[error("Feed and kill rates must be finite")]
    NonFiniteRates,
    #[error("Diffusion rates must be finite and non-negative")]
    InvalidDiffusion,
    #[error("Color ramp must have at least one stop")]
    EmptyRamp,
    #[error("Color ramp has {0} stops, the maximum is 5")]
    TooManyStops(usize),
    #[error("Color ramp thresholds must be strictly ascending within [0, 1]")]
    InvalidStops,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColorStop;

    #[test]
    fn test_default_is_valid() {
        let config = SimulationConfig::default();
        config.validate().unwrap();
        assert_eq!(config.substeps, 8);
        assert_eq!(config.display, DisplayChannel::V);
    }

    #[test]
    fn test_default_matches_first_preset() {
        let config = SimulationConfig::default();
        assert_eq!(config.feed, PRESETS[0].feed);
        assert_eq!(config.kill, PRESETS[0].kill);
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let config = SimulationConfig {
            width: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_rejects_zero_substeps() {
        let config = SimulationConfig {
            substeps: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSubsteps)));
    }

    #[test]
    fn test_rejects_non_finite_rates() {
        let config = SimulationConfig {
            feed: f32::NAN,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NonFiniteRates)));
    }

    #[test]
    fn test_rejects_invalid_ramp() {
        let mut config = SimulationConfig::default();
        config.ramp.stops.push(ColorStop {
            threshold: 0.0,
            color: [1.0, 1.0, 1.0, 1.0],
        });
        assert!(matches!(config.validate(), Err(ConfigError::InvalidStops)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = SimulationConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();
        back.validate().unwrap();
        assert_eq!(back.width, config.width);
        assert_eq!(back.feed, config.feed);
        assert_eq!(back.ramp.stops.len(), config.ramp.stops.len());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"width": 256, "height": 128, "feed": 0.03, "kill": 0.062}"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
        assert_eq!(config.substeps, 8);
        assert_eq!(config.diffusion_u, 1.0);
        assert_eq!(config.diffusion_v, 0.5);
    }
}
