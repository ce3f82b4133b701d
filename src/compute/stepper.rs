//! Simulation step program - one Euler update of the whole grid.
//!
//! CPU reference implementation of the same update rule the GPU step shader
//! runs; the GPU equivalence test in `gpu::renderer` pins the two together.

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use super::brush::brush_active;
use super::field::{Field, FieldPair};
use crate::schema::{ON_STATE, SimulationConfig};

/// Radius of the brush override region, in grid cells.
pub const BRUSH_RADIUS: f32 = 4.0;

/// Per-sub-step scalar parameters consumed by the update rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    pub delta: f32,
    pub feed: f32,
    pub kill: f32,
    pub diffusion_u: f32,
    pub diffusion_v: f32,
}

impl StepParams {
    /// Extract the scalar parameters for one sub-step.
    pub fn from_config(config: &SimulationConfig, delta: f32) -> Self {
        Self {
            delta,
            feed: config.feed,
            kill: config.kill,
            diffusion_u: config.diffusion_u,
            diffusion_v: config.diffusion_v,
        }
    }
}

/// Run one sub-step on the pair: source -> destination, then swap roles.
pub fn step_pair(pair: &mut FieldPair, params: &StepParams, brush: [f32; 2]) {
    let (source, destination) = pair.split_mut();
    step_field(source, destination, params, brush);
    pair.swap();
}

/// Compute the destination field from the source field.
///
/// For every cell: 5-point toroidal Laplacian, reaction u^2*v, explicit
/// Euler integration. Results are intentionally left unclamped. Cells within
/// `BRUSH_RADIUS` of an active brush coordinate are overridden to the seed
/// "on" pair instead of the computed update.
pub fn step_field(source: &Field, destination: &mut Field, params: &StepParams, brush: [f32; 2]) {
    debug_assert_eq!(source.width, destination.width);
    debug_assert_eq!(source.height, destination.height);

    let width = source.width;
    let brush_cell = brush_active(brush).then(|| {
        (
            brush[0] * source.width as f32,
            brush[1] * source.height as f32,
        )
    });

    #[cfg(not(target_arch = "wasm32"))]
    {
        destination
            .u
            .par_chunks_mut(width)
            .zip(destination.v.par_chunks_mut(width))
            .enumerate()
            .for_each(|(y, (row_u, row_v))| {
                step_row(source, params, brush_cell, y, row_u, row_v);
            });
    }

    #[cfg(target_arch = "wasm32")]
    {
        destination
            .u
            .chunks_mut(width)
            .zip(destination.v.chunks_mut(width))
            .enumerate()
            .for_each(|(y, (row_u, row_v))| {
                step_row(source, params, brush_cell, y, row_u, row_v);
            });
    }
}

fn step_row(
    source: &Field,
    params: &StepParams,
    brush_cell: Option<(f32, f32)>,
    y: usize,
    row_u: &mut [f32],
    row_v: &mut [f32],
) {
    let width = source.width;
    let height = source.height;
    let up = if y == 0 { height - 1 } else { y - 1 };
    let down = if y + 1 == height { 0 } else { y + 1 };

    for x in 0..width {
        let left = if x == 0 { width - 1 } else { x - 1 };
        let right = if x + 1 == width { 0 } else { x + 1 };

        if let Some((bx, by)) = brush_cell {
            let dx = x as f32 - bx;
            let dy = y as f32 - by;
            if dx * dx + dy * dy < BRUSH_RADIUS * BRUSH_RADIUS {
                row_u[x] = ON_STATE[0];
                row_v[x] = ON_STATE[1];
                continue;
            }
        }

        let i = y * width + x;
        let u = source.u[i];
        let v = source.v[i];

        let lap_u = source.u[y * width + left]
            + source.u[y * width + right]
            + source.u[up * width + x]
            + source.u[down * width + x]
            - 4.0 * u;
        let lap_v = source.v[y * width + left]
            + source.v[y * width + right]
            + source.v[up * width + x]
            + source.v[down * width + x]
            - 4.0 * v;

        let reaction = u * u * v;
        row_u[x] =
            u + params.delta * (params.diffusion_u * lap_u - reaction + params.feed * (1.0 - u));
        row_v[x] = v
            + params.delta
                * (params.diffusion_v * lap_v + reaction - (params.feed + params.kill) * v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::brush::BRUSH_SENTINEL;
    use crate::schema::{OFF_STATE, Pattern, Seed};

    fn params(delta: f32) -> StepParams {
        StepParams {
            delta,
            feed: 0.037,
            kill: 0.06,
            diffusion_u: 1.0,
            diffusion_v: 0.5,
        }
    }

    /// One reaction-only Euler update of a single (u, v) pair.
    fn reaction_only(u: f32, v: f32, p: &StepParams) -> (f32, f32) {
        let reaction = u * u * v;
        (
            u + p.delta * (-reaction + p.feed * (1.0 - u)),
            v + p.delta * (reaction - (p.feed + p.kill) * v),
        )
    }

    #[test]
    fn test_zero_delta_is_identity() {
        let seed = Seed::default();
        let mut pair = FieldPair::from_seed(&seed, 64, 64);
        let before = pair.source().clone();

        step_pair(&mut pair, &params(0.0), BRUSH_SENTINEL);

        assert_eq!(*pair.source(), before);
    }

    #[test]
    fn test_uniform_field_reaction_only_closed_form() {
        let p = params(0.8);
        let source = Field::uniform(32, 32, OFF_STATE[0], OFF_STATE[1]);
        let mut destination = Field::uniform(32, 32, 0.0, 0.0);

        step_field(&source, &mut destination, &p, BRUSH_SENTINEL);

        let (expected_u, expected_v) = reaction_only(OFF_STATE[0], OFF_STATE[1], &p);
        for i in 0..destination.u.len() {
            assert!((destination.u[i] - expected_u).abs() < 1e-6);
            assert!((destination.v[i] - expected_v).abs() < 1e-6);
        }
    }

    #[test]
    fn test_toroidal_left_edge_sees_right_edge() {
        let mut source = Field::uniform(16, 16, 0.0, 0.0);
        let i = source.idx(0, 5);
        source.u[i] = 1.0;
        let mut destination = Field::uniform(16, 16, 0.0, 0.0);

        let p = StepParams {
            delta: 1.0,
            feed: 0.0,
            kill: 0.0,
            diffusion_u: 1.0,
            diffusion_v: 0.0,
        };
        step_field(&source, &mut destination, &p, BRUSH_SENTINEL);

        // The impulse at x = 0 diffuses into its wrapped left neighbor.
        assert_eq!(destination.get(15, 5).0, 1.0);
        assert_eq!(destination.get(1, 5).0, 1.0);
        assert_eq!(destination.get(0, 4).0, 1.0);
        assert_eq!(destination.get(0, 6).0, 1.0);
        // No path to a cell two columns in.
        assert_eq!(destination.get(13, 5).0, 0.0);
    }

    #[test]
    fn test_toroidal_vertical_wrap() {
        let mut source = Field::uniform(8, 8, 0.0, 0.0);
        let i = source.idx(3, 0);
        source.u[i] = 1.0;
        let mut destination = Field::uniform(8, 8, 0.0, 0.0);

        let p = StepParams {
            delta: 1.0,
            feed: 0.0,
            kill: 0.0,
            diffusion_u: 1.0,
            diffusion_v: 0.0,
        };
        step_field(&source, &mut destination, &p, BRUSH_SENTINEL);

        assert_eq!(destination.get(3, 7).0, 1.0);
    }

    #[test]
    fn test_brush_overrides_within_radius_only() {
        let p = params(0.8);
        let source = Field::uniform(100, 100, OFF_STATE[0], OFF_STATE[1]);
        let mut destination = Field::uniform(100, 100, 0.0, 0.0);

        step_field(&source, &mut destination, &p, [0.5, 0.5]);

        let (expected_u, expected_v) = reaction_only(OFF_STATE[0], OFF_STATE[1], &p);
        for y in 0..100 {
            for x in 0..100 {
                let dx = x as f32 - 50.0;
                let dy = y as f32 - 50.0;
                let (u, v) = destination.get(x, y);
                if dx * dx + dy * dy < BRUSH_RADIUS * BRUSH_RADIUS {
                    assert_eq!((u, v), (ON_STATE[0], ON_STATE[1]), "at ({x}, {y})");
                } else {
                    assert!((u - expected_u).abs() < 1e-6, "at ({x}, {y})");
                    assert!((v - expected_v).abs() < 1e-6, "at ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_step_pair_swaps_roles() {
        let seed = Seed {
            pattern: Pattern::Uniform {
                u: OFF_STATE[0],
                v: OFF_STATE[1],
            },
        };
        let mut pair = FieldPair::from_seed(&seed, 16, 16);
        let p = params(0.5);

        step_pair(&mut pair, &p, BRUSH_SENTINEL);

        let (expected_u, _) = reaction_only(OFF_STATE[0], OFF_STATE[1], &p);
        // The freshly written field is now the source for the next sub-step.
        assert!((pair.source().get(4, 4).0 - expected_u).abs() < 1e-6);
        assert_eq!(pair.destination().get(4, 4).0, OFF_STATE[0]);
    }
}
