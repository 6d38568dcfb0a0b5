//! Run settings with defaults and RON persistence.

use std::path::{Path, PathBuf};

use relief_terrain::{
    BlendMode, CloudParams, ErosionParams, ParticleSeed, PipelineParams, TerrainRequest,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE: &str = "config.ron";

const APP_NAME: &str = "relief";

/// Top-level run configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Which terrain to generate.
    pub terrain: TerrainConfig,
    /// Fractal cloud settings.
    pub cloud: CloudParams,
    /// Erosion tunables.
    pub erosion: ErosionParams,
    /// Output files.
    pub export: ExportConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Terrain generation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// User seed, mixed before noise sampling.
    pub seed: u32,
    /// Region tile x coordinate.
    pub origin_x: i32,
    /// Region tile y coordinate.
    pub origin_y: i32,
    /// Field width in samples.
    pub width: u32,
    /// Field height in samples.
    pub height: u32,
    /// Erosion intensity (0 - 9).
    pub erosion_level: u8,
    /// Exponent mapping the erosion level to a particle count.
    pub erosion_exponent: u32,
    /// Weight of the erosion composite in percent (0 - 100).
    pub blend_percent: u8,
    /// Compositing operator for the erosion field.
    pub blend_mode: BlendMode,
    /// Fixed erosion particle seed; `None` seeds from entropy.
    pub particle_seed: Option<u64>,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory receiving generated files.
    pub output_dir: PathBuf,
    /// Write the composite field as a greyscale PNG.
    pub heightmap_png: bool,
    /// Write a closed solid of the composite field as binary STL.
    pub solid_stl: bool,
    /// Solid height above the floor slab for a field value of 1, in cells.
    pub relief: f32,
    /// Floor slab thickness in cells.
    pub base: f32,
    /// Per-axis scale (x, y, z) applied to the normalized mesh on export.
    pub stl_scale: [f32; 3],
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            origin_x: 0,
            origin_y: 0,
            width: 256,
            height: 256,
            erosion_level: 5,
            erosion_exponent: 7,
            blend_percent: 75,
            blend_mode: BlendMode::HardLight,
            particle_seed: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            heightmap_png: true,
            solid_stl: false,
            relief: 32.0,
            base: 2.0,
            stl_scale: [100.0, 100.0, 100.0],
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Pipeline wiring ---

impl TerrainConfig {
    /// Erosion particle seed selected by `particle_seed`.
    pub fn particle_seed(&self) -> ParticleSeed {
        ParticleSeed::from_option(self.particle_seed)
    }

    /// Generation request for these settings.
    pub fn request(&self) -> TerrainRequest {
        TerrainRequest {
            origin_x: self.origin_x,
            origin_y: self.origin_y,
            width: self.width as usize,
            height: self.height as usize,
            seed: self.seed,
            erosion_level: self.erosion_level,
            blend_percent: self.blend_percent,
            particle_seed: self.particle_seed(),
        }
    }
}

impl Config {
    /// Pipeline parameters assembled from the cloud, erosion and terrain sections.
    pub fn pipeline_params(&self) -> PipelineParams {
        PipelineParams {
            cloud: self.cloud.clone(),
            erosion: self.erosion.clone(),
            blend_mode: self.terrain.blend_mode,
            erosion_exponent: self.terrain.erosion_exponent,
        }
    }
}

// --- Load / Save / Reload ---

/// Per-user config directory, e.g. `~/.config/relief` on Linux.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as [`CONFIG_FILE`].
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        log::debug!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Re-read the file: returns `Some(new_config)` if it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
