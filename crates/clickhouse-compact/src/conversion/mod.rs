//! Conversion of `JSONCompact` responses into records.
//!
//! - [`envelope`] - Serde model of the response body
//! - [`config`] - Decoder configuration
//! - [`decoder`] - Response decoder and the lazy [`Records`] iterator

pub mod config;
pub mod decoder;
pub mod envelope;

pub use config::DecoderConfig;
pub use decoder::{Records, ResponseDecoder};
pub use envelope::{ColumnMeta, CompactResponse, QueryStatistics};
