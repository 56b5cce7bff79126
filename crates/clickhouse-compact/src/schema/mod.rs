//! Result schema resolution.
//!
//! Maps the `meta` section of a response to resolved column types.

pub mod mapping;

pub use mapping::{Column, ResultSchema, SchemaMapper};
