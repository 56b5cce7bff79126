//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::Result;
use crate::config::ConfigBuilder;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "chcompact")]
#[command(about = "Inspect ClickHouse type declarations and JSONCompact responses", long_about = None)]
#[command(version)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable JSON logging output
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the syntax tree and resolved descriptor of a type declaration
    ParseType {
        /// Declaration, e.g. "Nullable(Decimal(9, 2))"
        declaration: String,
    },

    /// Decode a saved JSONCompact response body
    Decode {
        /// Body file; "-" or omitted reads standard input
        input: Option<PathBuf>,

        /// Output format (json or tsv)
        #[arg(short, long)]
        format: Option<String>,

        /// Maximum number of records to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Largest body to read, in bytes (0 for no limit)
        #[arg(long)]
        max_body_bytes: Option<usize>,
    },
}

impl Args {
    /// Apply command-line values to `builder`.
    pub fn apply(&self, mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
        if self.verbose {
            builder = builder.log_level("debug");
        }

        if self.json_logs {
            builder = builder.json_logs(true);
        }

        if let Command::Decode {
            format,
            limit,
            max_body_bytes,
            ..
        } = &self.command
        {
            if let Some(format) = format {
                builder = builder.output_format(format.parse::<OutputFormat>()?);
            }

            if let Some(limit) = limit {
                builder = builder.limit(Some(*limit));
            }

            if let Some(max) = max_body_bytes {
                builder = builder.max_body_bytes((*max > 0).then_some(*max));
            }
        }

        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_type_args() {
        let args = Args::parse_from(["chcompact", "parse-type", "Array(String)"]);
        match args.command {
            Command::ParseType { declaration } => assert_eq!(declaration, "Array(String)"),
            Command::Decode { .. } => panic!("expected parse-type"),
        }
    }

    #[test]
    fn test_decode_args_apply() {
        let args = Args::parse_from([
            "chcompact", "decode", "body.json", "--format", "tsv", "--limit", "5", "-v",
        ]);
        let config = args.apply(ConfigBuilder::new()).unwrap().build().unwrap();
        assert_eq!(config.output.format, OutputFormat::Tsv);
        assert_eq!(config.output.limit, Some(5));
        assert_eq!(config.telemetry.log_level, "debug");
    }

    #[test]
    fn test_decode_stdin_default() {
        let args = Args::parse_from(["chcompact", "--json-logs", "decode"]);
        assert!(args.json_logs);
        match args.command {
            Command::Decode { input, .. } => assert!(input.is_none()),
            Command::ParseType { .. } => panic!("expected decode"),
        }
    }

    #[test]
    fn test_bad_format_rejected() {
        let args = Args::parse_from(["chcompact", "decode", "--format", "csv"]);
        assert!(args.apply(ConfigBuilder::new()).unwrap_err().is_config());
    }
}
