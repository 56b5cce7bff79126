//! Subcommand implementations

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use clickhouse_compact::{ResponseDecoder, TypeNode, TypeRegistry};
use tokio::io::AsyncRead;
use tracing::{debug, info};

use crate::Result;
use crate::config::Config;
use crate::output::RecordWriter;

/// Print the syntax tree and the resolved descriptor of `declaration`.
pub fn run_parse_type<W: Write>(
    registry: &TypeRegistry,
    declaration: &str,
    mut out: W,
) -> Result<()> {
    let node = TypeNode::parse(declaration)?;
    let descriptor = registry.resolve(&node)?;
    debug!(declaration, depth = node.depth(), "Resolved declaration");

    writeln!(out, "declaration: {declaration}")?;
    writeln!(out, "ast:         {node}")?;
    writeln!(out, "depth:       {}", node.depth())?;
    writeln!(out, "descriptor:  {descriptor}")?;
    writeln!(out, "nullable:    {}", descriptor.is_nullable())?;
    Ok(())
}

/// Open a body source; `None` or `-` reads standard input.
pub async fn open_input(path: Option<&Path>) -> Result<Box<dyn AsyncRead + Unpin + Send>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = tokio::fs::File::open(path).await?;
            Ok(Box::new(file))
        }
        _ => Ok(Box::new(tokio::io::stdin())),
    }
}

/// Decode one body from `input` and write its records to `out`.
///
/// Returns the number of records written. Stops at the configured limit;
/// a row that fails to convert aborts with its error after the rows
/// before it have been written.
pub async fn run_decode<R, W>(config: &Config, input: R, out: W) -> Result<usize>
where
    R: AsyncRead + Unpin,
    W: Write,
{
    let registry = Arc::new(config.registry()?);
    let decoder = ResponseDecoder::with_config(registry, config.decoder.clone());
    let records = decoder.decode_async_reader(input).await?;

    info!(
        columns = records.schema().len(),
        rows = records.len(),
        "Decoded response"
    );
    if let Some(stats) = records.statistics() {
        info!(
            elapsed = stats.elapsed,
            rows_read = stats.rows_read,
            bytes_read = stats.bytes_read,
            "Server statistics"
        );
    }

    let limit = config.output.limit.unwrap_or(usize::MAX);
    let mut writer = RecordWriter::new(out, config.output.format);
    let mut written = 0;
    for record in records.take(limit) {
        writer.write(&record?)?;
        written += 1;
    }
    writer.flush()?;

    debug!(written, "Wrote records");
    Ok(written)
}
