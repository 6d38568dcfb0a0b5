//! Command-line argument parsing for the relief generator.

use std::path::PathBuf;

use clap::Parser;
use relief_terrain::BlendMode;

use crate::Config;

/// Relief command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "relief", about = "Procedural terrain heightmaps and printable solids")]
pub struct CliArgs {
    /// Terrain seed.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Region tile x coordinate.
    #[arg(long, allow_hyphen_values = true)]
    pub origin_x: Option<i32>,

    /// Region tile y coordinate.
    #[arg(long, allow_hyphen_values = true)]
    pub origin_y: Option<i32>,

    /// Field width in samples.
    #[arg(long)]
    pub width: Option<u32>,

    /// Field height in samples.
    #[arg(long)]
    pub height: Option<u32>,

    /// Erosion intensity (0-9).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=9))]
    pub erosion: Option<u8>,

    /// Erosion blend in percent (0-100).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub blend: Option<u8>,

    /// Blend operator (hard-light, soft-light, overlay).
    #[arg(long)]
    pub blend_mode: Option<BlendMode>,

    /// Fixed erosion particle seed for reproducible output.
    #[arg(long)]
    pub particle_seed: Option<u64>,

    /// Output directory.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Write the heightmap PNG.
    #[arg(long)]
    pub png: Option<bool>,

    /// Write the solid STL.
    #[arg(long)]
    pub stl: Option<bool>,

    /// Solid relief height in cells.
    #[arg(long)]
    pub relief: Option<f32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.terrain.seed = seed;
        }
        if let Some(x) = args.origin_x {
            self.terrain.origin_x = x;
        }
        if let Some(y) = args.origin_y {
            self.terrain.origin_y = y;
        }
        if let Some(w) = args.width {
            self.terrain.width = w;
        }
        if let Some(h) = args.height {
            self.terrain.height = h;
        }
        if let Some(level) = args.erosion {
            self.terrain.erosion_level = level;
        }
        if let Some(blend) = args.blend {
            self.terrain.blend_percent = blend;
        }
        if let Some(mode) = args.blend_mode {
            self.terrain.blend_mode = mode;
        }
        if let Some(seed) = args.particle_seed {
            self.terrain.particle_seed = Some(seed);
        }
        if let Some(ref dir) = args.output {
            self.export.output_dir = dir.clone();
        }
        if let Some(png) = args.png {
            self.export.heightmap_png = png;
        }
        if let Some(stl) = args.stl {
            self.export.solid_stl = stl;
        }
        if let Some(relief) = args.relief {
            self.export.relief = relief;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
