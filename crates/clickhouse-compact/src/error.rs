//! Error hierarchy for clickhouse-compact.
//!
//! Follows the "canonical error struct" pattern: a single public [`Error`]
//! wrapping a private [`ErrorKind`], classified through `is_xxx()` predicates
//! rather than by matching on internals.

use std::fmt;

use thiserror::Error;

/// Longest raw value kept verbatim in a decode error message.
const MAX_RAW_VALUE_LEN: usize = 120;

/// Root error type for clickhouse-compact.
///
/// Captures every failure mode of type parsing, resolution and response
/// decoding. Exposes predicate methods (`is_xxx()`) for error
/// classification without exposing internals.
///
/// # Example
///
/// ```rust,ignore
/// use clickhouse_compact::Error;
///
/// fn handle_error(err: Error) {
///     if err.is_unknown_type() {
///         eprintln!("server reported a type this client does not know");
///     } else if err.is_decode_value() {
///         eprintln!("bad value in column {:?}, row {:?}", err.column(), err.row());
///     }
/// }
/// ```
#[derive(Error, Debug)]
#[error("{kind}{}", display_column(.column))]
pub struct Error {
    kind: ErrorKind,
    column: Option<Box<ColumnContext>>,
}

/// Column whose declared type failed to parse or resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ColumnContext {
    pub(crate) name: String,
    pub(crate) declaration: String,
}

impl fmt::Display for ColumnContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " (column '{}' declared as {})", self.name, self.declaration)
    }
}

/// Where in a response a value failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DecodeLocation {
    pub(crate) column: String,
    pub(crate) row: usize,
    pub(crate) declaration: String,
}

impl fmt::Display for DecodeLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " (column '{}' of type {}, row {})",
            self.column, self.declaration, self.row
        )
    }
}

/// Internal error classification.
///
/// This enum is `pub(crate)` to allow adding variants without breaking changes.
/// External code should use the `is_xxx()` predicate methods instead.
#[derive(Error, Debug)]
#[non_exhaustive]
pub(crate) enum ErrorKind {
    /// Malformed type declaration text.
    #[error("syntax error in type declaration '{declaration}' at offset {offset} near '{snippet}': {message}")]
    Syntax {
        declaration: String,
        offset: usize,
        snippet: String,
        message: String,
    },

    /// Well-formed declaration naming a type absent from the registry.
    #[error("unknown type: {name}")]
    UnknownType { name: String },

    /// Registered type constructed with arguments of the wrong count or kind.
    #[error("invalid arguments for type {name}: {message}")]
    InvalidTypeArguments { name: String, message: String },

    /// Wire value does not match its resolved descriptor.
    #[error("cannot decode value {value} as {expected}: {message}{}", display_location(.location))]
    DecodeValue {
        expected: String,
        value: String,
        message: String,
        location: Option<Box<DecodeLocation>>,
    },

    /// Native value with no wire or JSON representation.
    #[error("unsupported value: {message}")]
    UnsupportedValue { message: String },

    /// Row width differs from the number of columns.
    #[error("schema mismatch at row {row}: expected {expected} values, got {actual}")]
    SchemaMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Typed extraction of a decoded value failed.
    #[error("value conversion failed for column '{column}': {message}")]
    ValueConversion { column: String, message: String },

    /// Response body is not a valid JSONCompact envelope.
    #[error("malformed response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    /// Reading the response body failed.
    #[error("I/O error while reading response: {0}")]
    Io(#[from] std::io::Error),

    /// Response body exceeded the configured buffer limit.
    #[error("response body exceeds limit of {limit} bytes")]
    BodyTooLarge { limit: usize },
}

impl Error {
    // ═══════════════════════════════════════════════════════════════════════
    // Constructors
    // ═══════════════════════════════════════════════════════════════════════

    const fn new(kind: ErrorKind) -> Self {
        Self { kind, column: None }
    }

    /// Create error for malformed declaration text.
    #[must_use]
    pub fn syntax(
        declaration: impl Into<String>,
        offset: usize,
        snippet: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::Syntax {
                declaration: declaration.into(),
                offset,
                snippet: snippet.into(),
                message: message.into(),
            })
    }

    /// Create error for a type name missing from the registry.
    #[must_use]
    pub fn unknown_type(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownType { name: name.into() })
    }

    /// Create error for arguments a type constructor rejected.
    #[must_use]
    pub fn invalid_type_arguments(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidTypeArguments {
                name: name.into(),
                message: message.into(),
            })
    }

    /// Create error for a wire value that does not fit its descriptor.
    ///
    /// `expected` names the type being decoded, `value` is the offending raw
    /// wire value. Long values are shortened.
    #[must_use]
    pub fn decode_value(
        expected: impl Into<String>,
        value: &serde_json::Value,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::DecodeValue {
                expected: expected.into(),
                value: abbreviate(&value.to_string()),
                message: message.into(),
                location: None,
            })
    }

    /// Create error for a native value that has no wire representation.
    #[must_use]
    pub fn unsupported_value(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedValue {
                message: message.into(),
            })
    }

    /// Create error for a row whose width differs from the column count.
    #[must_use]
    pub const fn schema_mismatch(row: usize, expected: usize, actual: usize) -> Self {
        Self::new(ErrorKind::SchemaMismatch {
                row,
                expected,
                actual,
            })
    }

    /// Create error for a failed typed extraction.
    #[must_use]
    pub fn value_conversion(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValueConversion {
                column: column.into(),
                message: message.into(),
            })
    }

    /// Create error for a body larger than the configured limit.
    #[must_use]
    pub const fn body_too_large(limit: usize) -> Self {
        Self::new(ErrorKind::BodyTooLarge { limit })
    }

    /// Attach the column, row and declaration a decode error happened at.
    ///
    /// Has no effect on other error kinds, or when a location is already set.
    #[must_use]
    pub(crate) fn at(mut self, column: &str, row: usize, declaration: &str) -> Self {
        if let ErrorKind::DecodeValue { location, .. } = &mut self.kind
            && location.is_none()
        {
            *location = Some(Box::new(DecodeLocation {
                column: column.to_owned(),
                row,
                declaration: declaration.to_owned(),
            }));
        }
        self
    }

    /// Attach the column whose declaration failed to parse or resolve.
    ///
    /// Only syntax, unknown type and invalid arguments errors take a column.
    #[must_use]
    pub(crate) fn for_column(mut self, name: &str, declaration: &str) -> Self {
        let resolution = matches!(
            self.kind,
            ErrorKind::Syntax { .. }
                | ErrorKind::UnknownType { .. }
                | ErrorKind::InvalidTypeArguments { .. }
        );
        if resolution && self.column.is_none() {
            self.column = Some(Box::new(ColumnContext {
                name: name.to_owned(),
                declaration: declaration.to_owned(),
            }));
        }
        self
    }

    /// Prefix the message of a decode error with the position inside a
    /// composite value, e.g. `element 2`.
    #[must_use]
    pub(crate) fn within(mut self, path: impl fmt::Display) -> Self {
        if let ErrorKind::DecodeValue { message, .. } = &mut self.kind {
            *message = format!("{path}: {message}");
        }
        self
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Predicate Methods (is_xxx)
    // ═══════════════════════════════════════════════════════════════════════

    /// Returns true if this is a declaration syntax error.
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(self.kind, ErrorKind::Syntax { .. })
    }

    /// Returns true if this is an unknown type error.
    #[must_use]
    pub const fn is_unknown_type(&self) -> bool {
        matches!(self.kind, ErrorKind::UnknownType { .. })
    }

    /// Returns true if this is an invalid type arguments error.
    #[must_use]
    pub const fn is_invalid_type_arguments(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidTypeArguments { .. })
    }

    /// Returns true if this is a value decoding error.
    #[must_use]
    pub const fn is_decode_value(&self) -> bool {
        matches!(self.kind, ErrorKind::DecodeValue { .. })
    }

    /// Returns true if this is an unsupported value error.
    #[must_use]
    pub const fn is_unsupported_value(&self) -> bool {
        matches!(self.kind, ErrorKind::UnsupportedValue { .. })
    }

    /// Returns true if this is a schema mismatch error.
    #[must_use]
    pub const fn is_schema_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::SchemaMismatch { .. })
    }

    /// Returns true if this is a typed extraction error.
    #[must_use]
    pub const fn is_value_conversion(&self) -> bool {
        matches!(self.kind, ErrorKind::ValueConversion { .. })
    }

    /// Returns true if the response body was not a valid envelope.
    #[must_use]
    pub const fn is_malformed_response(&self) -> bool {
        matches!(self.kind, ErrorKind::MalformedResponse(_))
    }

    /// Returns true if reading the body failed.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Io(_))
    }

    /// Returns true if the body exceeded the configured limit.
    #[must_use]
    pub const fn is_body_too_large(&self) -> bool {
        matches!(self.kind, ErrorKind::BodyTooLarge { .. })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Context Accessors
    // ═══════════════════════════════════════════════════════════════════════

    /// Column the error happened at, if known.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::DecodeValue {
                location: Some(location),
                ..
            } => Some(location.column.as_str()),
            ErrorKind::ValueConversion { column, .. } => Some(column.as_str()),
            _ => self.column.as_ref().map(|c| c.name.as_str()),
        }
    }

    /// Type declaration involved in the error, if known.
    #[must_use]
    pub fn declaration(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Syntax { declaration, .. } => Some(declaration.as_str()),
            ErrorKind::DecodeValue {
                location: Some(location),
                ..
            } => Some(location.declaration.as_str()),
            _ => self.column.as_ref().map(|c| c.declaration.as_str()),
        }
    }

    /// Zero-based row index the error happened at, if known.
    #[must_use]
    pub fn row(&self) -> Option<usize> {
        match &self.kind {
            ErrorKind::DecodeValue {
                location: Some(location),
                ..
            } => Some(location.row),
            ErrorKind::SchemaMismatch { row, .. } => Some(*row),
            _ => None,
        }
    }

    /// Byte offset of a syntax error inside the declaration.
    #[must_use]
    pub const fn offset(&self) -> Option<usize> {
        match &self.kind {
            ErrorKind::Syntax { offset, .. } => Some(*offset),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::MalformedResponse(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(err))
    }
}

fn display_column(column: &Option<Box<ColumnContext>>) -> String {
    column.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn display_location(location: &Option<Box<DecodeLocation>>) -> String {
    location.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn abbreviate(raw: &str) -> String {
    if raw.len() <= MAX_RAW_VALUE_LEN {
        return raw.to_owned();
    }
    let mut end = MAX_RAW_VALUE_LEN;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &raw[..end])
}

/// Result type alias for clickhouse-compact operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::unknown_type("Foo");
        assert!(err.is_unknown_type());
        assert!(!err.is_syntax());
        assert_eq!(err.to_string(), "unknown type: Foo");
    }

    #[test]
    fn test_syntax_error() {
        let err = Error::syntax("Array(", 6, "", "expected type name");
        assert!(err.is_syntax());
        assert_eq!(err.offset(), Some(6));
        assert!(err.to_string().contains("offset 6"));
    }

    #[test]
    fn test_invalid_type_arguments() {
        let err = Error::invalid_type_arguments("Decimal", "expected 2 arguments");
        assert!(err.is_invalid_type_arguments());
        assert!(err.to_string().contains("Decimal"));
    }

    #[test]
    fn test_decode_value_location() {
        let err = Error::decode_value("UInt8", &json!(300), "out of range").at("n", 0, "UInt8");
        assert!(err.is_decode_value());
        assert_eq!(err.column(), Some("n"));
        assert_eq!(err.row(), Some(0));
        let display = err.to_string();
        assert!(display.contains("300"));
        assert!(display.contains("column 'n'"));
        assert!(display.contains("row 0"));
    }

    #[test]
    fn test_location_is_set_once() {
        let err = Error::decode_value("UInt8", &json!(1), "bad")
            .at("inner", 1, "UInt8")
            .at("outer", 2, "UInt8");
        assert_eq!(err.column(), Some("inner"));
        assert_eq!(err.row(), Some(1));
    }

    #[test]
    fn test_within_prefixes_message() {
        let err = Error::decode_value("UInt8", &json!("x"), "not a number").within("element 1");
        assert!(err.to_string().contains("element 1: not a number"));
    }

    #[test]
    fn test_at_ignores_other_kinds() {
        let err = Error::unknown_type("Foo").at("c", 3, "Foo");
        assert_eq!(err.column(), None);
        assert_eq!(err.row(), None);
    }

    #[test]
    fn test_for_column_on_resolution_errors() {
        let err = Error::unknown_type("Foo").for_column("amount", "Array(Foo)");
        assert_eq!(err.column(), Some("amount"));
        assert_eq!(err.declaration(), Some("Array(Foo)"));
        assert_eq!(
            err.to_string(),
            "unknown type: Foo (column 'amount' declared as Array(Foo))"
        );

        let err = Error::syntax("Array(", 6, "", "expected type name").for_column("a", "Array(");
        assert_eq!(err.column(), Some("a"));
        assert_eq!(err.declaration(), Some("Array("));
    }

    #[test]
    fn test_for_column_ignores_other_kinds() {
        let err = Error::body_too_large(1).for_column("a", "UInt8");
        assert_eq!(err.column(), None);
        assert_eq!(err.declaration(), None);
    }

    #[test]
    fn test_schema_mismatch() {
        let err = Error::schema_mismatch(4, 2, 3);
        assert!(err.is_schema_mismatch());
        assert_eq!(err.row(), Some(4));
        assert!(err.to_string().contains("expected 2 values, got 3"));
    }

    #[test]
    fn test_long_values_are_abbreviated() {
        let long = "x".repeat(500);
        let err = Error::decode_value("UInt8", &json!(long), "not a number");
        assert!(err.to_string().contains("..."));
        assert!(err.to_string().len() < 300);
    }

    #[test]
    fn test_error_debug() {
        let err = Error::body_too_large(10);
        let debug_str = format!("{err:?}");
        assert!(debug_str.contains("Error"));
        assert!(err.is_body_too_large());
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(json_err);
        assert!(err.is_malformed_response());
    }
}
