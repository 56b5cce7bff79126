//! `JSONCompact` response envelope.

use serde::{Deserialize, Serialize};

/// Name and declared type of one result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    /// Column name; may repeat within a result.
    pub name: String,
    /// Type declaration text, e.g. `Nullable(UInt8)`.
    #[serde(rename = "type")]
    pub type_name: String,
}

impl ColumnMeta {
    /// Create column metadata.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Server-side execution statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryStatistics {
    /// Elapsed seconds.
    pub elapsed: f64,
    /// Rows read by the query.
    pub rows_read: u64,
    /// Bytes read by the query.
    pub bytes_read: u64,
}

/// A whole `JSONCompact` body.
///
/// Row values stay raw JSON until a decoder converts them. Numbers keep
/// their original text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactResponse {
    /// Columns in order.
    pub meta: Vec<ColumnMeta>,
    /// Rows, each with one wire value per column.
    #[serde(default)]
    pub data: Vec<Vec<serde_json::Value>>,
    /// Row count reported by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
    /// Rows the query would return without `LIMIT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_before_limit_at_least: Option<u64>,
    /// Execution statistics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<QueryStatistics>,
}

impl CompactResponse {
    /// Parse a body.
    ///
    /// # Errors
    ///
    /// Returns a malformed response error when the body is not a valid
    /// envelope.
    pub fn from_slice(body: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}
