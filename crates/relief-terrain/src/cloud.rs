//! Multi-octave value-noise "cloud" fields.
//!
//! A per-sample base layer of [`HashNoise`] is summed with coarser octaves.
//! Octave `l` samples the lattice every `2^l` cells, bilinearly interpolates
//! between those points and contributes with amplitude `2^l`, so coarse
//! features dominate and fine ones add texture.

use serde::{Deserialize, Serialize};

use crate::error::TerrainError;
use crate::field::ScalarField;
use crate::hash_noise::HashNoise;

/// Upper bound on octave count; the coarsest step is `2^MAX_OCTAVES` cells.
pub const MAX_OCTAVES: u32 = 16;

/// Configuration for [`FractalCloud`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudParams {
    /// Number of interpolated octaves above the base layer, clamped to
    /// [`MAX_OCTAVES`]. Default: 7 (steps 2 through 128).
    pub octaves: u32,
}

impl Default for CloudParams {
    fn default() -> Self {
        Self { octaves: 7 }
    }
}

/// Fractal value-noise generator.
#[derive(Clone, Debug, Default)]
pub struct FractalCloud {
    params: CloudParams,
}

impl FractalCloud {
    /// Create a generator with the given parameters.
    pub fn new(params: CloudParams) -> Self {
        Self { params }
    }

    /// Effective octave count after clamping.
    pub fn octaves(&self) -> u32 {
        self.params.octaves.min(MAX_OCTAVES)
    }

    /// Sum of all layer amplitudes: `1 + 2 + 4 + ... + 2^octaves`.
    ///
    /// Dividing by this keeps the output in `[0, 1)`. For the default seven
    /// octaves it is 255.
    pub fn normalization(&self) -> f32 {
        ((1_u64 << (self.octaves() + 1)) - 1) as f32
    }

    /// Generate a `width × height` cloud for the region tile at `(origin_x, origin_y)`.
    ///
    /// Tiles at the right and bottom border that do not fit a whole octave
    /// step are truncated, not wrapped.
    pub fn generate(
        &self,
        origin_x: i32,
        origin_y: i32,
        width: usize,
        height: usize,
        seed: u32,
    ) -> Result<ScalarField, TerrainError> {
        let noise = HashNoise::for_region(origin_x, origin_y, width, height, seed);
        let mut field = ScalarField::from_fn(width, height, |x, y| {
            noise.sample(x as i32, y as i32)
        })?;

        for octave in 1..=self.octaves() {
            add_octave(&mut field, &noise, 1_usize << octave);
        }

        let norm = self.normalization();
        for v in field.as_mut_slice() {
            *v /= norm;
        }
        Ok(field)
    }
}

/// Accumulate one bilinearly interpolated octave with lattice spacing `step`.
fn add_octave(field: &mut ScalarField, noise: &HashNoise, step: usize) {
    let (width, height) = field.dimensions();
    let amplitude = step as f32;
    let inv_step = 1.0 / step as f32;
    let data = field.as_mut_slice();

    for ty in (0..height).step_by(step) {
        for tx in (0..width).step_by(step) {
            let (lx, ly, s) = (tx as i32, ty as i32, step as i32);
            let a = noise.sample(lx, ly) * amplitude;
            let b = noise.sample(lx + s, ly) * amplitude;
            let c = noise.sample(lx, ly + s) * amplitude;
            let d = noise.sample(lx + s, ly + s) * amplitude;

            for iy in 0..step.min(height - ty) {
                let wy = iy as f32 * inv_step;
                let ac = a * (1.0 - wy) + c * wy;
                let bd = b * (1.0 - wy) + d * wy;
                let row = (ty + iy) * width;

                for ix in 0..step.min(width - tx) {
                    let wx = ix as f32 * inv_step;
                    data[row + tx + ix] += ac * (1.0 - wx) + bd * wx;
                }
            }
        }
    }
}
