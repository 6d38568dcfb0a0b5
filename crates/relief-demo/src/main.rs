//! `relief`: generate a terrain heightmap and optionally a printable solid.
//!
//! Loads `config.ron` (creating it on first run), applies CLI overrides,
//! runs the terrain pipeline and writes a greyscale PNG and a binary STL into
//! the configured output directory.

use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use relief_config::{CliArgs, Config, default_config_dir};
use relief_mesh::{HeightfieldVolume, MeshError, normalize, write_stl};
use relief_terrain::{GrayscaleImage, ScalarField, TerrainError, TerrainPipeline};
use tracing::{error, info, warn};

/// Failures that abort a run.
#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("terrain generation failed: {0}")]
    Terrain(#[from] TerrainError),
    #[error("mesh extraction failed: {0}")]
    Mesh(#[from] MeshError),
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Files produced by one run.
#[derive(Debug, Default)]
struct RunOutput {
    heightmap: Option<PathBuf>,
    solid: Option<PathBuf>,
}

fn file_stem(config: &Config) -> String {
    let t = &config.terrain;
    format!("relief_{}_{}_{}", t.seed, t.origin_x, t.origin_y)
}

fn write_heightmap(field: &ScalarField, path: &Path) -> Result<(), RunError> {
    let gray = GrayscaleImage::from_field(field);
    let (width, height) = gray.dimensions();
    image::save_buffer(path, &gray.pixels, width, height, image::ColorType::Rgba8).map_err(
        |source| RunError::Image {
            path: path.to_path_buf(),
            source,
        },
    )
}

fn write_solid(field: &ScalarField, config: &Config, path: &Path) -> Result<(), RunError> {
    let export = &config.export;
    let mut mesh = HeightfieldVolume::new(field, export.relief)
        .with_base(export.base)
        .to_mesh()?;
    if normalize(&mut mesh).is_none() {
        warn!("solid has no vertices, writing an empty STL");
    }

    let io_err = |source: std::io::Error| RunError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    write_stl(&mesh, export.stl_scale, file).map_err(io_err)?;
    info!(
        triangles = mesh.triangle_count(),
        path = %path.display(),
        "solid written"
    );
    Ok(())
}

fn run(config: &Config) -> Result<RunOutput, RunError> {
    let pipeline = TerrainPipeline::new(config.pipeline_params());
    let request = config.terrain.request();
    let terrain = pipeline.generate(&request)?;
    info!(
        seed = request.seed,
        width = request.width,
        height = request.height,
        particles = terrain.particles,
        reproducible = config.terrain.particle_seed.is_some(),
        "terrain generated"
    );

    let out_dir = &config.export.output_dir;
    std::fs::create_dir_all(out_dir).map_err(|source| RunError::Io {
        path: out_dir.clone(),
        source,
    })?;
    let stem = file_stem(config);
    let mut output = RunOutput::default();

    if config.export.heightmap_png {
        let path = out_dir.join(format!("{stem}.png"));
        write_heightmap(&terrain.composite, &path)?;
        info!(path = %path.display(), "heightmap written");
        output.heightmap = Some(path);
    }
    if config.export.solid_stl {
        let path = out_dir.join(format!("{stem}.stl"));
        write_solid(&terrain.composite, config, &path)?;
        output.solid = Some(path);
    }
    Ok(output)
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = match args.config.clone() {
        Some(dir) => dir,
        None => default_config_dir().unwrap_or_else(|e| {
            eprintln!("{e}, using the working directory");
            PathBuf::from(".")
        }),
    };

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    relief_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(output) => {
            if output.heightmap.is_none() && output.solid.is_none() {
                warn!("no outputs enabled; set export.heightmap_png or export.solid_stl");
            }
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
