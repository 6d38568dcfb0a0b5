//! Run configuration for the relief generator.
//!
//! Settings persist to disk as RON, every section falls back to defaults when
//! missing, and CLI flags override individual values.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CONFIG_FILE, Config, DebugConfig, ExportConfig, TerrainConfig, default_config_dir};
pub use error::ConfigError;
