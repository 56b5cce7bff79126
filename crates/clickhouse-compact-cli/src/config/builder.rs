//! Configuration builder

use std::collections::BTreeMap;

use clickhouse_compact::{DecoderConfig, TypeRegistry};

use crate::output::OutputFormat;
use crate::{CliError, Result};

/// Tool configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub decoder: DecoderConfig,
    pub output: OutputConfig,
    pub telemetry: TelemetryConfig,
    /// Extra type names, alias -> registered target
    pub aliases: BTreeMap<String, String>,
}

impl Config {
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Built-in registry extended with the configured aliases.
    pub fn registry(&self) -> Result<TypeRegistry> {
        let mut registry = TypeRegistry::new();
        for (alias, target) in &self.aliases {
            registry.register_alias(alias.clone(), target).map_err(|e| {
                CliError::Config(format!("Invalid type alias {alias} = {target}: {e}"))
            })?;
        }
        Ok(registry)
    }
}

/// Output configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Stop after this many records
    pub limit: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json_logs: bool,
}

/// Configuration builder with fluent API
#[derive(Debug)]
pub struct ConfigBuilder {
    decoder: DecoderConfig,
    output: OutputConfig,
    telemetry: TelemetryConfig,
    aliases: BTreeMap<String, String>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoder: DecoderConfig::default(),
            output: OutputConfig {
                format: OutputFormat::Json,
                limit: None,
            },
            telemetry: TelemetryConfig {
                log_level: String::new(),
                json_logs: false,
            },
            aliases: BTreeMap::new(),
        }
    }

    /// Body limit; `None` reads bodies of any size
    #[must_use]
    pub const fn max_body_bytes(mut self, limit: Option<usize>) -> Self {
        self.decoder.max_body_bytes = limit;
        self
    }

    #[must_use]
    pub const fn descriptor_cache_capacity(mut self, capacity: usize) -> Self {
        self.decoder.descriptor_cache_capacity = capacity;
        self
    }

    #[must_use]
    pub const fn output_format(mut self, format: OutputFormat) -> Self {
        self.output.format = format;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: Option<usize>) -> Self {
        self.output.limit = limit;
        self
    }

    #[must_use]
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.telemetry.log_level = level.into();
        self
    }

    #[must_use]
    pub const fn json_logs(mut self, enabled: bool) -> Self {
        self.telemetry.json_logs = enabled;
        self
    }

    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.insert(alias.into(), target.into());
        self
    }

    pub fn build(self) -> Result<Config> {
        if self.decoder.max_body_bytes == Some(0) {
            return Err(CliError::Config(
                "max_body_bytes must be positive; omit it to use the default".into(),
            ));
        }

        let log_level = if self.telemetry.log_level.is_empty() {
            "warn".to_string()
        } else {
            self.telemetry.log_level
        };

        Ok(Config {
            decoder: self.decoder,
            output: self.output,
            telemetry: TelemetryConfig {
                log_level,
                json_logs: self.telemetry.json_logs,
            },
            aliases: self.aliases,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
