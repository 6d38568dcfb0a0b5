//! Procedural terrain synthesis: hash noise, fractal clouds, tone operators,
//! particle erosion and the seeded generation pipeline.

mod cloud;
mod erosion;
mod error;
mod field;
mod hash_noise;
mod pipeline;
mod raster;
mod seed;

pub mod tone;

pub use cloud::{CloudParams, FractalCloud, MAX_OCTAVES};
pub use erosion::{ErosionParams, ErosionSimulator, NEIGHBOR_SCAN, box_blur, steepest_descent};
pub use error::TerrainError;
pub use field::ScalarField;
pub use hash_noise::{HASH_MUL_X, HASH_MUL_Y, HashNoise, hash_noise};
pub use pipeline::{
    PipelineParams, TerrainOutput, TerrainPipeline, TerrainRequest, generate_terrain,
};
pub use raster::{GrayscaleImage, to_channel};
pub use seed::{CONTROL_OFFSET, ParticleSeed, hash_field, mix_seed, particles_for_level};
pub use tone::{BlendMode, ParseBlendModeError};
