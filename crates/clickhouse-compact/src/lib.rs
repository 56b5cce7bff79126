//! Type-driven decoding of ClickHouse `JSONCompact` responses.
//!
//! This crate turns the column type declarations a server reports
//! (`Nullable(Enum8('' = -128, 'a' = 1))`) into typed descriptors, and uses
//! them to convert compact JSON rows into ordered, name-addressable
//! [`Record`]s.
//!
//! # Features
//!
//! - `nom`-based parser for the full type declaration grammar
//! - Extensible [`TypeRegistry`] mapping type names to descriptor factories
//! - Exact decimals, 128/256-bit integers, dates, addresses and UUIDs
//! - Lazy row conversion with column and row context on every error
//! - LRU cache of resolved descriptors shared across responses
//! - Sealed [`FromValue`] trait for typed extraction
//! - Optional async body reading and streaming (`async` feature)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use clickhouse_compact::{ResponseDecoder, TypeRegistry};
//!
//! let decoder = ResponseDecoder::new(Arc::new(TypeRegistry::new()));
//! let body = br#"{"meta":[{"name":"id","type":"UInt8"}],"data":[[1],[2]]}"#;
//! for record in decoder.decode_slice(body)? {
//!     let id: u8 = record?.get_by_name_as("id")?;
//! }
//! ```
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cache;
pub mod conversion;
pub mod error;
pub mod grammar;
pub mod record;
pub mod schema;
pub mod traits;
pub mod types;

// Re-export main types for convenience
pub use cache::DescriptorCache;
pub use conversion::{
    ColumnMeta, CompactResponse, DecoderConfig, QueryStatistics, Records, ResponseDecoder,
};
pub use error::{Error, Result};
pub use grammar::{AstArg, TypeNode};
pub use record::Record;
pub use schema::{Column, ResultSchema, SchemaMapper};
pub use traits::FromValue;
pub use types::{
    CustomType, DecimalSpec, EnumSpec, EnumWidth, TypeArg, TypeDescriptor, TypeFactory,
    TypeRegistry, Value, parse_type,
};
