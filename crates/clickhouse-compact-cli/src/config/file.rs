//! TOML configuration file loading

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::builder::ConfigBuilder;
use crate::output::OutputFormat;
use crate::{CliError, Result};

/// Configuration file locations checked in order
const CONFIG_PATHS: &[&str] = &["./chcompact.toml", "~/.config/chcompact/config.toml"];

/// Find the first existing configuration file
pub fn find_config_file() -> Option<PathBuf> {
    for path_str in CONFIG_PATHS {
        let path = if path_str.starts_with('~') {
            if let Ok(home) = std::env::var("HOME") {
                PathBuf::from(path_str.replacen('~', &home, 1))
            } else {
                continue;
            }
        } else {
            PathBuf::from(path_str)
        };

        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path, builder: ConfigBuilder) -> Result<ConfigBuilder> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        CliError::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    let file_config: FileConfig = toml::from_str(&content).map_err(|e| {
        CliError::Config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })?;

    apply_file_config(builder, file_config)
}

fn apply_file_config(mut builder: ConfigBuilder, config: FileConfig) -> Result<ConfigBuilder> {
    // Decoder settings
    if let Some(decoder) = config.decoder {
        // 0 lifts the limit
        if let Some(limit) = decoder.max_body_bytes {
            builder = builder.max_body_bytes((limit > 0).then_some(limit));
        }

        if let Some(capacity) = decoder.descriptor_cache_capacity {
            builder = builder.descriptor_cache_capacity(capacity);
        }
    }

    // Output settings
    if let Some(output) = config.output {
        if let Some(format) = output.format {
            builder = builder.output_format(format.parse::<OutputFormat>()?);
        }

        if let Some(limit) = output.limit {
            builder = builder.limit(Some(limit));
        }
    }

    // Observability settings
    if let Some(obs) = config.observability {
        if let Some(level) = obs.log_level {
            builder = builder.log_level(level);
        }

        if let Some(json) = obs.json_logs {
            builder = builder.json_logs(json);
        }
    }

    // Type aliases
    if let Some(types) = config.types {
        for (alias, target) in types.aliases {
            builder = builder.alias(alias, target);
        }
    }

    Ok(builder)
}

/// Root configuration file structure
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    decoder: Option<DecoderFileConfig>,
    output: Option<OutputFileConfig>,
    observability: Option<ObservabilityConfig>,
    types: Option<TypesConfig>,
}

#[derive(Debug, Deserialize)]
struct DecoderFileConfig {
    max_body_bytes: Option<usize>,
    descriptor_cache_capacity: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct OutputFileConfig {
    format: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ObservabilityConfig {
    log_level: Option<String>,
    json_logs: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct TypesConfig {
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}
