//! Seeded terrain generation: cloud, contrast shaping, erosion and compositing.
//!
//! 1. `base` cloud from the mixed seed.
//! 2. `control` cloud from the mixed seed plus [`CONTROL_OFFSET`], contrast
//!    boosted with `sigma(3)` and scaled by 3 into a per-sample exponent.
//! 3. `heightfield = vector_sigma(base, control)`: sharper where the control
//!    field is hot.
//! 4. `erosion = erode(heightfield)` with `level^exponent` particles.
//! 5. `composite = blend(heightfield, erosion)` by `blend_percent / 100`.

use tracing::debug;

use crate::cloud::{CloudParams, FractalCloud};
use crate::erosion::{ErosionParams, ErosionSimulator};
use crate::error::TerrainError;
use crate::field::ScalarField;
use crate::seed::{CONTROL_OFFSET, ParticleSeed, mix_seed, particles_for_level};
use crate::tone::{self, BlendMode};

/// Contrast exponent applied to the control cloud.
const CONTROL_SIGMA: f32 = 3.0;
/// Scale turning the shaped control cloud into a sigma exponent.
const CONTROL_SCALE: f32 = 3.0;

/// Static configuration of a [`TerrainPipeline`].
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineParams {
    /// Cloud generator settings shared by the base and control clouds.
    pub cloud: CloudParams,
    /// Erosion tunables.
    pub erosion: ErosionParams,
    /// Operator compositing the erosion field onto the heightfield.
    pub blend_mode: BlendMode,
    /// Exponent mapping the erosion level to a particle count. Default: 7.
    pub erosion_exponent: u32,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            cloud: CloudParams::default(),
            erosion: ErosionParams::default(),
            blend_mode: BlendMode::HardLight,
            erosion_exponent: 7,
        }
    }
}

/// One terrain generation call.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainRequest {
    /// Region tile x coordinate.
    pub origin_x: i32,
    /// Region tile y coordinate.
    pub origin_y: i32,
    /// Field width in samples.
    pub width: usize,
    /// Field height in samples.
    pub height: usize,
    /// User seed; mixed with [`mix_seed`] before noise sampling.
    pub seed: u32,
    /// Erosion intensity, clamped to `0..=9`.
    pub erosion_level: u8,
    /// Weight of the erosion composite, clamped to `0..=100`.
    pub blend_percent: u8,
    /// Seed for erosion particle spawning.
    pub particle_seed: ParticleSeed,
}

/// All fields produced by a generation call.
#[derive(Clone, Debug)]
pub struct TerrainOutput {
    /// Shaped heightfield before erosion. Deterministic for a given request.
    pub heightfield: ScalarField,
    /// Eroded copy of the heightfield.
    pub erosion: ScalarField,
    /// Final composite, clamped to `[0, 1]`.
    pub composite: ScalarField,
    /// Number of particles simulated.
    pub particles: u64,
}

/// Orchestrates cloud synthesis, tone shaping and erosion.
#[derive(Clone, Debug, Default)]
pub struct TerrainPipeline {
    cloud: FractalCloud,
    erosion: ErosionSimulator,
    params: PipelineParams,
}

impl TerrainPipeline {
    /// Create a pipeline with the given parameters.
    pub fn new(params: PipelineParams) -> Self {
        Self {
            cloud: FractalCloud::new(params.cloud.clone()),
            erosion: ErosionSimulator::new(params.erosion.clone()),
            params,
        }
    }

    /// Return a reference to the current parameters.
    pub fn params(&self) -> &PipelineParams {
        &self.params
    }

    /// Build the pre-erosion heightfield (steps 1 to 3).
    pub fn heightfield(
        &self,
        origin_x: i32,
        origin_y: i32,
        width: usize,
        height: usize,
        seed: u32,
    ) -> Result<ScalarField, TerrainError> {
        let mixed = mix_seed(seed);

        let mut base = self.cloud.generate(origin_x, origin_y, width, height, mixed)?;
        let mut control = self.cloud.generate(
            origin_x,
            origin_y,
            width,
            height,
            mixed.wrapping_add(CONTROL_OFFSET),
        )?;
        tone::sigma(&mut control, CONTROL_SIGMA);
        tone::scale(&mut control, CONTROL_SCALE);

        tone::vector_sigma(&mut base, &control)?;
        Ok(base)
    }

    /// Run the full pipeline.
    pub fn generate(&self, request: &TerrainRequest) -> Result<TerrainOutput, TerrainError> {
        let heightfield = self.heightfield(
            request.origin_x,
            request.origin_y,
            request.width,
            request.height,
            request.seed,
        )?;

        let particles = particles_for_level(request.erosion_level, self.params.erosion_exponent);
        let erosion = self
            .erosion
            .erode_seeded(&heightfield, particles, request.particle_seed);

        let mut composite = heightfield.clone();
        let amount = f32::from(request.blend_percent.min(100)) / 100.0;
        tone::blend(&mut composite, &erosion, self.params.blend_mode, amount)?;
        composite.clamp_unit();

        debug!(
            width = request.width,
            height = request.height,
            particles,
            blend = %self.params.blend_mode,
            amount,
            "terrain generated"
        );

        Ok(TerrainOutput {
            heightfield,
            erosion,
            composite,
            particles,
        })
    }
}

/// Generate a terrain field with default pipeline settings.
///
/// Erosion particles are seeded from entropy, so only the pre-erosion
/// heightfield is reproducible across calls. Use [`TerrainPipeline`] with
/// [`ParticleSeed::Fixed`] for fully reproducible output.
pub fn generate_terrain(
    origin_x: i32,
    origin_y: i32,
    width: usize,
    height: usize,
    seed: u32,
    erosion_level: u8,
    blend_percent: u8,
) -> Result<ScalarField, TerrainError> {
    let request = TerrainRequest {
        origin_x,
        origin_y,
        width,
        height,
        seed,
        erosion_level,
        blend_percent,
        particle_seed: ParticleSeed::Entropy,
    };
    Ok(TerrainPipeline::default().generate(&request)?.composite)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::hash_field;

    fn request(seed: u32, level: u8, blend: u8, particle_seed: ParticleSeed) -> TerrainRequest {
        TerrainRequest {
            origin_x: 0,
            origin_y: 0,
            width: 64,
            height: 64,
            seed,
            erosion_level: level,
            blend_percent: blend,
            particle_seed,
        }
    }

    #[test]
    fn test_end_to_end_scenario() {
        let field = generate_terrain(0, 0, 64, 64, 12345, 5, 75).unwrap();
        assert_eq!(field.dimensions(), (64, 64));
        let (lo, hi) = field.min_max();
        assert!(lo >= 0.0 && hi <= 1.0, "range [{lo}, {hi}]");
    }

    #[test]
    fn test_pre_erosion_field_deterministic() {
        let pipeline = TerrainPipeline::default();
        let a = pipeline
            .generate(&request(12345, 5, 75, ParticleSeed::Entropy))
            .unwrap();
        let b = pipeline
            .generate(&request(12345, 5, 75, ParticleSeed::Entropy))
            .unwrap();
        assert_eq!(hash_field(&a.heightfield), hash_field(&b.heightfield));
        assert_eq!(a.particles, 78_125);
    }

    #[test]
    fn test_fixed_particle_seed_fully_deterministic() {
        let pipeline = TerrainPipeline::default();
        let req = request(777, 3, 60, ParticleSeed::Fixed(31));
        let a = pipeline.generate(&req).unwrap();
        let b = pipeline.generate(&req).unwrap();
        assert_eq!(a.composite, b.composite);
    }

    #[test]
    fn test_zero_blend_returns_heightfield() {
        let out = TerrainPipeline::default()
            .generate(&request(5, 2, 0, ParticleSeed::Fixed(1)))
            .unwrap();
        assert_eq!(out.composite, out.heightfield);
    }

    #[test]
    fn test_blend_mode_is_configurable() {
        let req = request(5, 2, 100, ParticleSeed::Fixed(1));
        let hard = TerrainPipeline::default().generate(&req).unwrap();
        let soft = TerrainPipeline::new(PipelineParams {
            blend_mode: BlendMode::SoftLight,
            ..Default::default()
        })
        .generate(&req)
        .unwrap();
        assert_eq!(hard.heightfield, soft.heightfield);
        assert_ne!(hard.composite, soft.composite);
    }

    #[test]
    fn test_different_seeds_different_heightfields() {
        let pipeline = TerrainPipeline::default();
        let a = pipeline.heightfield(0, 0, 32, 32, 1).unwrap();
        let b = pipeline.heightfield(0, 0, 32, 32, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_dimensions() {
        let err = generate_terrain(0, 0, 0, 64, 1, 1, 50).unwrap_err();
        assert_eq!(
            err,
            TerrainError::InvalidDimensions {
                width: 0,
                height: 64
            }
        );
    }
}
