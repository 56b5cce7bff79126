//! Command-line inspector for ClickHouse type declarations and `JSONCompact`
//! responses, built on `clickhouse-compact`.

pub mod cli;
pub mod commands;
pub mod config;
mod error;
pub mod observability;
pub mod output;

pub use config::{Config, ConfigBuilder, OutputConfig, TelemetryConfig};
pub use error::{CliError, Result};
pub use output::{OutputFormat, RecordWriter};
