use std::io::{self, BufWriter};

use clap::Parser;
use clickhouse_compact_cli::cli::{Args, Command};
use clickhouse_compact_cli::commands::{open_input, run_decode, run_parse_type};
use clickhouse_compact_cli::config::{self, ConfigBuilder};
use clickhouse_compact_cli::observability::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Precedence: env > file > CLI > defaults
    let builder = args.apply(ConfigBuilder::new())?;
    let builder = config::load_config(args.config.as_deref(), builder)?;
    let config = builder.build()?;

    init_logging(&config.telemetry);
    tracing::debug!("Decoder config: {:?}", config.decoder);

    match &args.command {
        Command::ParseType { declaration } => {
            let registry = config.registry()?;
            run_parse_type(&registry, declaration, io::stdout().lock())?;
        }
        Command::Decode { input, .. } => {
            let reader = open_input(input.as_deref()).await?;
            let out = BufWriter::new(io::stdout().lock());
            let written = run_decode(&config, reader, out).await?;
            tracing::info!("Wrote {written} records");
        }
    }

    Ok(())
}
