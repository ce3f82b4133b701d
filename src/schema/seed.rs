//! Seed types for initializing the concentration field.
//!
//! The uniform steady state never destabilizes on its own; the default fill
//! policy plants a perturbed "on" square at the grid center so pattern
//! formation has somewhere to start.

use serde::{Deserialize, Serialize};

/// Concentration pair inside a seeded region.
pub const ON_STATE: [f32; 2] = [0.5, 0.25];
/// Concentration pair of the quiescent background.
pub const OFF_STATE: [f32; 2] = [1.01, 0.019];

/// Complete seed specification for field initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    /// Pattern to use for seeding.
    pub pattern: Pattern,
}

impl Default for Seed {
    fn default() -> Self {
        Self {
            pattern: Pattern::CenterSquare {
                half_extent: 10,
                noise: 0.01,
                rng_seed: 0,
            },
        }
    }
}

/// Predefined fill policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    /// A square of the "on" pair at the grid center, "off" pair elsewhere,
    /// both perturbed by uniform noise in [-noise, noise].
    CenterSquare {
        /// Half the square's side length, in cells.
        half_extent: usize,
        /// Perturbation amplitude. Zero gives an exactly uniform background.
        noise: f32,
        /// Seed for the deterministic noise generator.
        rng_seed: u64,
    },
    /// The same (u, v) pair everywhere.
    Uniform { u: f32, v: f32 },
}

impl Seed {
    /// Generate initial per-cell (u, v) pairs, row-major.
    pub fn generate(&self, width: usize, height: usize) -> Vec<[f32; 2]> {
        let mut cells = vec![[0.0f32; 2]; width * height];

        match &self.pattern {
            Pattern::CenterSquare {
                half_extent,
                noise,
                rng_seed,
            } => {
                let cx = width / 2;
                let cy = height / 2;
                let half = *half_extent;
                let mut rng_state = *rng_seed;

                for y in 0..height {
                    for x in 0..width {
                        let inside = x + half > cx
                            && x < cx + half
                            && y + half > cy
                            && y < cy + half;
                        let base = if inside { ON_STATE } else { OFF_STATE };
                        cells[y * width + x] = [
                            base[0] + noise * (2.0 * lcg_next(&mut rng_state) - 1.0),
                            base[1] + noise * (2.0 * lcg_next(&mut rng_state) - 1.0),
                        ];
                    }
                }
            }
            Pattern::Uniform { u, v } => {
                cells.fill([*u, *v]);
            }
        }

        cells
    }
}

// Simple LCG PRNG for deterministic noise
fn lcg_next(state: &mut u64) -> f32 {
    *state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
    (*state >> 33) as f32 / (1u64 << 31) as f32
}
