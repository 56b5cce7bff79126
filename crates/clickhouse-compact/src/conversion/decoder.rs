//! Response decoding.
//!
//! [`ResponseDecoder`] buffers a whole body, resolves every column type
//! once, and hands back [`Records`], a lazy iterator converting one row per
//! step.

use std::io::Read;
use std::iter::FusedIterator;
use std::num::NonZeroUsize;
use std::sync::Arc;

use serde_json::Value as Json;
use tracing::{debug, warn};

use super::config::DecoderConfig;
use super::envelope::{ColumnMeta, CompactResponse, QueryStatistics};
use crate::cache::DescriptorCache;
use crate::record::Record;
use crate::schema::{ResultSchema, SchemaMapper};
use crate::types::TypeRegistry;
use crate::{Error, Result};

/// Decodes `JSONCompact` bodies into records.
///
/// Cheap to clone; clones share the registry and the descriptor cache.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use clickhouse_compact::{ResponseDecoder, TypeRegistry};
///
/// let decoder = ResponseDecoder::new(Arc::new(TypeRegistry::new()));
/// for record in decoder.decode_slice(body)? {
///     let record = record?;
///     println!("{}", record["n"]);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ResponseDecoder {
    registry: Arc<TypeRegistry>,
    config: DecoderConfig,
    cache: Option<Arc<DescriptorCache>>,
}

impl ResponseDecoder {
    /// Decoder with the default configuration.
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_config(registry, DecoderConfig::default())
    }

    /// Decoder with an explicit configuration.
    #[must_use]
    pub fn with_config(registry: Arc<TypeRegistry>, config: DecoderConfig) -> Self {
        let cache = NonZeroUsize::new(config.descriptor_cache_capacity)
            .map(|capacity| Arc::new(DescriptorCache::new(capacity)));
        Self {
            registry,
            config,
            cache,
        }
    }

    /// The registry declarations are resolved against.
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Descriptor cache, when enabled.
    #[must_use]
    pub fn cache(&self) -> Option<&DescriptorCache> {
        self.cache.as_deref()
    }

    /// Resolve column metadata into a schema.
    ///
    /// # Errors
    ///
    /// Returns the first syntax, unknown type or invalid arguments error.
    pub fn resolve_schema(&self, meta: &[ColumnMeta]) -> Result<ResultSchema> {
        SchemaMapper::new(&self.registry)
            .with_cache(self.cache())
            .resolve(meta)
    }

    /// Decode an already parsed envelope.
    ///
    /// Every column is resolved before this returns; rows are converted
    /// while iterating.
    ///
    /// # Errors
    ///
    /// Returns an error if any column type fails to resolve.
    pub fn decode_response(&self, response: CompactResponse) -> Result<Records> {
        let schema = self.resolve_schema(&response.meta)?;
        debug!(
            columns = schema.len(),
            rows = response.data.len(),
            "Decoding response"
        );
        Ok(Records {
            schema: Arc::new(schema),
            rows: response.data.into_iter(),
            next_row: 0,
            failed: false,
            rows_before_limit_at_least: response.rows_before_limit_at_least,
            statistics: response.statistics,
        })
    }

    /// Decode a buffered body.
    ///
    /// # Errors
    ///
    /// Returns a malformed response error for an invalid envelope, otherwise
    /// the errors of [`decode_response`](Self::decode_response).
    pub fn decode_slice(&self, body: &[u8]) -> Result<Records> {
        self.decode_response(CompactResponse::from_slice(body)?)
    }

    /// Read a whole body from `reader` and decode it.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading fails and a body too large error if
    /// the body exceeds [`DecoderConfig::max_body_bytes`].
    pub fn decode_reader<R: Read>(&self, reader: R) -> Result<Records> {
        let mut body = Vec::new();
        match self.config.max_body_bytes {
            Some(limit) => {
                reader.take(read_limit(limit)).read_to_end(&mut body)?;
                check_limit(&body, limit)?;
            }
            None => {
                let mut reader = reader;
                reader.read_to_end(&mut body)?;
            }
        }
        self.decode_slice(&body)
    }

    /// Read a whole body from an async `reader` and decode it.
    ///
    /// Reading is the only suspension point; conversion stays synchronous.
    ///
    /// # Errors
    ///
    /// Same as [`decode_reader`](Self::decode_reader).
    #[cfg(feature = "async")]
    pub async fn decode_async_reader<R>(&self, reader: R) -> Result<Records>
    where
        R: tokio::io::AsyncRead + Unpin,
    {
        use tokio::io::AsyncReadExt;

        let mut body = Vec::new();
        match self.config.max_body_bytes {
            Some(limit) => {
                reader.take(read_limit(limit)).read_to_end(&mut body).await?;
                check_limit(&body, limit)?;
            }
            None => {
                let mut reader = reader;
                reader.read_to_end(&mut body).await?;
            }
        }
        self.decode_slice(&body)
    }
}

/// Read one byte past the limit so that an oversized body is detectable.
fn read_limit(limit: usize) -> u64 {
    u64::try_from(limit).map_or(u64::MAX, |limit| limit.saturating_add(1))
}

fn check_limit(body: &[u8], limit: usize) -> Result<()> {
    if body.len() > limit {
        warn!(limit, "Response body exceeds limit");
        return Err(Error::body_too_large(limit));
    }
    Ok(())
}

/// Lazy sequence of decoded rows.
///
/// Yields one `Result<Record>` per row in server order. After the first
/// error the iterator is exhausted. Collecting into `Result<Vec<Record>>`
/// therefore either returns every row or the first error.
#[derive(Debug)]
pub struct Records {
    schema: Arc<ResultSchema>,
    rows: std::vec::IntoIter<Vec<Json>>,
    next_row: usize,
    failed: bool,
    rows_before_limit_at_least: Option<u64>,
    statistics: Option<QueryStatistics>,
}

impl Records {
    /// Resolved columns.
    #[must_use]
    pub fn schema(&self) -> &ResultSchema {
        &self.schema
    }

    /// Execution statistics sent by the server.
    #[must_use]
    pub const fn statistics(&self) -> Option<&QueryStatistics> {
        self.statistics.as_ref()
    }

    /// Row count the query would have without `LIMIT`.
    #[must_use]
    pub const fn rows_before_limit_at_least(&self) -> Option<u64> {
        self.rows_before_limit_at_least
    }

    /// Turn the records into a stream.
    #[cfg(feature = "async")]
    pub fn into_stream(self) -> impl futures::Stream<Item = Result<Record>> + Send {
        futures::stream::iter(self)
    }

    fn convert(&self, row_index: usize, row: &[Json]) -> Result<Record> {
        let columns = self.schema.columns();
        if row.len() != columns.len() {
            return Err(Error::schema_mismatch(row_index, columns.len(), row.len()));
        }
        let values = columns
            .iter()
            .zip(row)
            .map(|(column, wire)| {
                column
                    .descriptor()
                    .decode(wire)
                    .map_err(|e| e.at(column.name(), row_index, column.declaration()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Record::new(Arc::clone(self.schema.names()), values))
    }
}

impl Iterator for Records {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let row = self.rows.next()?;
        let row_index = self.next_row;
        self.next_row += 1;

        let result = self.convert(row_index, &row);
        if let Err(err) = &result {
            warn!(row = row_index, error = %err, "Failed to decode row");
            self.failed = true;
            self.rows = Vec::new().into_iter();
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for Records {}

impl FusedIterator for Records {}
