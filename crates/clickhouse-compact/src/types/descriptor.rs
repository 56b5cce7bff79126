//! Resolved type descriptors.
//!
//! A [`TypeDescriptor`] is the immutable, recursive form of a type
//! declaration. Each variant knows how to turn one JSON wire value into a
//! native [`Value`]. Composite variants own their children and delegate to
//! them.

use std::fmt;
use std::sync::Arc;

use serde_json::Value as Json;

use super::decimal::DecimalSpec;
use super::enumeration::EnumSpec;
use super::scalar;
use super::value::Value;
use crate::grammar::write_quoted;
use crate::{Error, Result};

/// User-supplied type registered under a custom name.
///
/// Implementations must be immutable once registered: the same descriptor
/// may decode values from several threads at once.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug)]
/// struct Point;
///
/// impl CustomType for Point {
///     fn name(&self) -> String {
///         "Point".to_owned()
///     }
///
///     fn decode(&self, wire: &serde_json::Value) -> Result<Value> {
///         let items = wire.as_array().ok_or_else(|| {
///             Error::decode_value("Point", wire, "expected [x, y]")
///         })?;
///         // ...
///     }
/// }
/// ```
pub trait CustomType: fmt::Debug + Send + Sync {
    /// Canonical declaration of this type, used in messages.
    fn name(&self) -> String;

    /// Decode one wire value.
    ///
    /// # Errors
    ///
    /// Returns a decode error when the wire value does not fit the type.
    fn decode(&self, wire: &Json) -> Result<Value>;
}

/// A resolved column type.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// `Nothing`: has no values; only meaningful as `Nullable(Nothing)`.
    Nothing,
    /// `Bool`.
    Bool,
    /// `UInt8`.
    UInt8,
    /// `UInt16`.
    UInt16,
    /// `UInt32`.
    UInt32,
    /// `UInt64`.
    UInt64,
    /// `UInt128`.
    UInt128,
    /// `UInt256`.
    UInt256,
    /// `Int8`.
    Int8,
    /// `Int16`.
    Int16,
    /// `Int32`.
    Int32,
    /// `Int64`.
    Int64,
    /// `Int128`.
    Int128,
    /// `Int256`.
    Int256,
    /// `Float32`.
    Float32,
    /// `Float64`.
    Float64,
    /// `String`.
    String,
    /// `FixedString(n)`.
    FixedString(usize),
    /// `UUID`.
    Uuid,
    /// `Date`.
    Date,
    /// `Date32`.
    Date32,
    /// `DateTime([timezone])`. The timezone is kept but not applied.
    DateTime {
        /// Declared timezone name.
        timezone: Option<String>,
    },
    /// `DateTime64(precision[, timezone])`.
    DateTime64 {
        /// Sub-second digits, `0..=9`.
        precision: u8,
        /// Declared timezone name.
        timezone: Option<String>,
    },
    /// `Decimal(P, S)` and its fixed-width shorthands.
    Decimal(DecimalSpec),
    /// `Enum8(...)` / `Enum16(...)`.
    Enum(EnumSpec),
    /// `IPv4`.
    Ipv4,
    /// `IPv6`.
    Ipv6,
    /// `Nullable(T)`.
    Nullable(Box<Self>),
    /// `LowCardinality(T)`, decoded exactly as `T`.
    LowCardinality(Box<Self>),
    /// `Array(T)`.
    Array(Box<Self>),
    /// `Tuple(T1, ..., Tn)`.
    Tuple(Vec<Self>),
    /// `Map(K, V)`.
    Map(Box<Self>, Box<Self>),
    /// Type supplied through [`TypeRegistry::register`](crate::TypeRegistry::register).
    Custom(Arc<dyn CustomType>),
}

impl TypeDescriptor {
    /// Returns true for `Nullable(T)`.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    /// Decode one JSON wire value into a native value.
    ///
    /// Pure and deterministic: the descriptor is never mutated.
    ///
    /// # Errors
    ///
    /// Returns a decode error when the wire value does not structurally
    /// match this type. A `null` is only accepted under `Nullable`.
    pub fn decode(&self, wire: &Json) -> Result<Value> {
        match self {
            Self::Nothing => Err(self.mismatch(wire, "type Nothing has no values")),
            Self::Bool => scalar::boolean("Bool", wire).map(Value::Bool),
            Self::UInt8 => scalar::integer("UInt8", wire).map(Value::UInt8),
            Self::UInt16 => scalar::integer("UInt16", wire).map(Value::UInt16),
            Self::UInt32 => scalar::integer("UInt32", wire).map(Value::UInt32),
            Self::UInt64 => scalar::integer("UInt64", wire).map(Value::UInt64),
            Self::UInt128 => scalar::integer("UInt128", wire).map(Value::UInt128),
            Self::UInt256 => scalar::uint256("UInt256", wire).map(Value::UInt256),
            Self::Int8 => scalar::integer("Int8", wire).map(Value::Int8),
            Self::Int16 => scalar::integer("Int16", wire).map(Value::Int16),
            Self::Int32 => scalar::integer("Int32", wire).map(Value::Int32),
            Self::Int64 => scalar::integer("Int64", wire).map(Value::Int64),
            Self::Int128 => scalar::integer("Int128", wire).map(Value::Int128),
            Self::Int256 => scalar::int256("Int256", wire).map(Value::Int256),
            Self::Float32 => scalar::float("Float32", wire).map(Value::Float32),
            Self::Float64 => scalar::float("Float64", wire).map(Value::Float64),
            Self::String => scalar::string("String", wire).map(Value::String),
            Self::FixedString(length) => {
                scalar::fixed_string(&self.to_string(), wire, *length).map(Value::String)
            }
            Self::Uuid => scalar::uuid("UUID", wire).map(Value::Uuid),
            Self::Date | Self::Date32 => scalar::date(&self.to_string(), wire).map(Value::Date),
            Self::DateTime { .. } => {
                scalar::datetime(&self.to_string(), wire, false).map(Value::DateTime)
            }
            Self::DateTime64 { .. } => {
                scalar::datetime(&self.to_string(), wire, true).map(Value::DateTime)
            }
            Self::Decimal(spec) => spec.decode(wire).map(Value::Decimal),
            Self::Enum(spec) => spec.decode(wire).map(Value::Enum),
            Self::Ipv4 => scalar::ipv4("IPv4", wire).map(Value::Ipv4),
            Self::Ipv6 => scalar::ipv6("IPv6", wire).map(Value::Ipv6),
            Self::Nullable(inner) => {
                if wire.is_null() {
                    Ok(Value::Null)
                } else {
                    inner.decode(wire)
                }
            }
            Self::LowCardinality(inner) => inner.decode(wire),
            Self::Array(element) => {
                let items = self.array(wire)?;
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        element
                            .decode(item)
                            .map_err(|e| e.within(format_args!("element {i}")))
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array)
            }
            Self::Tuple(elements) => {
                let items = self.array(wire)?;
                if items.len() != elements.len() {
                    return Err(self.mismatch(
                        wire,
                        format!(
                            "expected {} elements, got {}",
                            elements.len(),
                            items.len()
                        ),
                    ));
                }
                elements
                    .iter()
                    .zip(items)
                    .enumerate()
                    .map(|(i, (element, item))| {
                        element
                            .decode(item)
                            .map_err(|e| e.within(format_args!("element {i}")))
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Tuple)
            }
            // Duplicate wire keys were already merged by the JSON parser.
            Self::Map(key_type, value_type) => {
                let object = wire
                    .as_object()
                    .ok_or_else(|| self.mismatch(wire, "expected an object"))?;
                let mut entries = Vec::with_capacity(object.len());
                for (key, value) in object {
                    let decoded_key = key_type
                        .decode(&Json::String(key.clone()))
                        .map_err(|e| e.within(format_args!("key '{key}'")))?;
                    let decoded_value = value_type
                        .decode(value)
                        .map_err(|e| e.within(format_args!("value of key '{key}'")))?;
                    entries.push((decoded_key, decoded_value));
                }
                Ok(Value::Map(entries))
            }
            Self::Custom(custom) => custom.decode(wire),
        }
    }

    fn array<'v>(&self, wire: &'v Json) -> Result<&'v Vec<Json>> {
        wire.as_array()
            .ok_or_else(|| self.mismatch(wire, "expected an array"))
    }

    fn mismatch(&self, wire: &Json, message: impl Into<String>) -> Error {
        Error::decode_value(self.to_string(), wire, message)
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nothing => f.write_str("Nothing"),
            Self::Bool => f.write_str("Bool"),
            Self::UInt8 => f.write_str("UInt8"),
            Self::UInt16 => f.write_str("UInt16"),
            Self::UInt32 => f.write_str("UInt32"),
            Self::UInt64 => f.write_str("UInt64"),
            Self::UInt128 => f.write_str("UInt128"),
            Self::UInt256 => f.write_str("UInt256"),
            Self::Int8 => f.write_str("Int8"),
            Self::Int16 => f.write_str("Int16"),
            Self::Int32 => f.write_str("Int32"),
            Self::Int64 => f.write_str("Int64"),
            Self::Int128 => f.write_str("Int128"),
            Self::Int256 => f.write_str("Int256"),
            Self::Float32 => f.write_str("Float32"),
            Self::Float64 => f.write_str("Float64"),
            Self::String => f.write_str("String"),
            Self::FixedString(length) => write!(f, "FixedString({length})"),
            Self::Uuid => f.write_str("UUID"),
            Self::Date => f.write_str("Date"),
            Self::Date32 => f.write_str("Date32"),
            Self::DateTime { timezone: None } => f.write_str("DateTime"),
            Self::DateTime {
                timezone: Some(tz),
            } => {
                f.write_str("DateTime(")?;
                write_quoted(f, tz)?;
                f.write_str(")")
            }
            Self::DateTime64 {
                precision,
                timezone,
            } => {
                write!(f, "DateTime64({precision}")?;
                if let Some(tz) = timezone {
                    f.write_str(", ")?;
                    write_quoted(f, tz)?;
                }
                f.write_str(")")
            }
            Self::Decimal(spec) => write!(f, "{spec}"),
            Self::Enum(spec) => write!(f, "{spec}"),
            Self::Ipv4 => f.write_str("IPv4"),
            Self::Ipv6 => f.write_str("IPv6"),
            Self::Nullable(inner) => write!(f, "Nullable({inner})"),
            Self::LowCardinality(inner) => write!(f, "LowCardinality({inner})"),
            Self::Array(element) => write!(f, "Array({element})"),
            Self::Tuple(elements) => {
                f.write_str("Tuple(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str(")")
            }
            Self::Map(key, value) => write!(f, "Map({key}, {value})"),
            Self::Custom(custom) => f.write_str(&custom.name()),
        }
    }
}
