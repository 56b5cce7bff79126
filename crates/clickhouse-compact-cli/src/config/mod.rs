//! Configuration management
//!
//! Supports configuration loading with precedence: env > file > CLI > defaults

mod builder;
mod env;
mod file;

pub use builder::{Config, ConfigBuilder, OutputConfig, TelemetryConfig};
pub use file::find_config_file;

use std::path::Path;

use crate::Result;

/// Layer the config file and environment over `builder`.
///
/// `builder` carries defaults and command-line values. An explicit `path`
/// must exist; otherwise the first file found by [`find_config_file`] is
/// used, if any.
pub fn load_config(path: Option<&Path>, mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
    let found = match path {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file(),
    };

    if let Some(path) = found {
        tracing::debug!("Loading configuration from {}", path.display());
        builder = file::load_from_file(&path, builder)?;
    }

    // Override with environment variables
    env::load_from_env(builder)
}
