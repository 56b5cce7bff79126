//! Native in-memory values produced by type descriptors.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use num_bigint::{BigInt, BigUint};
use uuid::Uuid;

use crate::{Error, Result};

/// A decoded column value.
///
/// Each variant corresponds to a family of server types. Integer widths are
/// preserved so that a `UInt8` column never silently widens.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL `NULL`, produced by `Nullable(T)` for a `null` wire value.
    Null,
    /// `Bool`.
    Bool(bool),
    /// `UInt8`.
    UInt8(u8),
    /// `UInt16`.
    UInt16(u16),
    /// `UInt32`.
    UInt32(u32),
    /// `UInt64`.
    UInt64(u64),
    /// `UInt128`.
    UInt128(u128),
    /// `UInt256`.
    UInt256(BigUint),
    /// `Int8`.
    Int8(i8),
    /// `Int16`.
    Int16(i16),
    /// `Int32`.
    Int32(i32),
    /// `Int64`.
    Int64(i64),
    /// `Int128`.
    Int128(i128),
    /// `Int256`.
    Int256(BigInt),
    /// `Float32`.
    Float32(f32),
    /// `Float64`.
    Float64(f64),
    /// `Decimal*`, rescaled to the declared scale.
    Decimal(BigDecimal),
    /// `String` and `FixedString(n)`.
    String(String),
    /// `UUID`.
    Uuid(Uuid),
    /// `Date` and `Date32`.
    Date(NaiveDate),
    /// `DateTime` and `DateTime64`, as reported by the server.
    DateTime(NaiveDateTime),
    /// `Enum8` / `Enum16` label.
    Enum(String),
    /// `IPv4`.
    Ipv4(Ipv4Addr),
    /// `IPv6`.
    Ipv6(Ipv6Addr),
    /// `Array(T)`.
    Array(Vec<Self>),
    /// `Tuple(T1, ..., Tn)`.
    Tuple(Vec<Self>),
    /// `Map(K, V)` entries in server order.
    ///
    /// The wire form is a JSON object, so a key repeated on the wire
    /// yields a single entry at its first position holding its last value.
    Map(Vec<(Self, Self)>),
}

impl Value {
    /// Returns true for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short name of the variant, used in conversion errors.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::UInt8(_) => "UInt8",
            Self::UInt16(_) => "UInt16",
            Self::UInt32(_) => "UInt32",
            Self::UInt64(_) => "UInt64",
            Self::UInt128(_) => "UInt128",
            Self::UInt256(_) => "UInt256",
            Self::Int8(_) => "Int8",
            Self::Int16(_) => "Int16",
            Self::Int32(_) => "Int32",
            Self::Int64(_) => "Int64",
            Self::Int128(_) => "Int128",
            Self::Int256(_) => "Int256",
            Self::Float32(_) => "Float32",
            Self::Float64(_) => "Float64",
            Self::Decimal(_) => "Decimal",
            Self::String(_) => "String",
            Self::Uuid(_) => "UUID",
            Self::Date(_) => "Date",
            Self::DateTime(_) => "DateTime",
            Self::Enum(_) => "Enum",
            Self::Ipv4(_) => "IPv4",
            Self::Ipv6(_) => "IPv6",
            Self::Array(_) => "Array",
            Self::Tuple(_) => "Tuple",
            Self::Map(_) => "Map",
        }
    }

    /// Borrow the text of a `String` or `Enum` value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    /// Render as JSON.
    ///
    /// Large integers and decimals become strings so that no precision is
    /// lost; dates, addresses and UUIDs use their canonical text. Map keys
    /// are rendered with [`Display`](fmt::Display).
    ///
    /// # Errors
    ///
    /// Returns an unsupported value error for non-finite floats, which have
    /// no JSON representation.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        use serde_json::Value as Json;

        Ok(match self {
            Self::Null => Json::Null,
            Self::Bool(v) => Json::Bool(*v),
            Self::UInt8(v) => Json::from(*v),
            Self::UInt16(v) => Json::from(*v),
            Self::UInt32(v) => Json::from(*v),
            Self::UInt64(v) => Json::from(*v),
            Self::Int8(v) => Json::from(*v),
            Self::Int16(v) => Json::from(*v),
            Self::Int32(v) => Json::from(*v),
            Self::Int64(v) => Json::from(*v),
            Self::UInt128(v) => Json::String(v.to_string()),
            Self::Int128(v) => Json::String(v.to_string()),
            Self::UInt256(v) => Json::String(v.to_string()),
            Self::Int256(v) => Json::String(v.to_string()),
            Self::Float32(v) => finite_number(f64::from(*v))?,
            Self::Float64(v) => finite_number(*v)?,
            Self::Decimal(v) => Json::String(v.to_string()),
            Self::String(s) | Self::Enum(s) => Json::String(s.clone()),
            Self::Uuid(_)
            | Self::Date(_)
            | Self::DateTime(_)
            | Self::Ipv4(_)
            | Self::Ipv6(_) => Json::String(self.to_string()),
            Self::Array(items) | Self::Tuple(items) => Json::Array(
                items
                    .iter()
                    .map(Self::to_json)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Self::Map(entries) => {
                let mut object = serde_json::Map::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = match key {
                        Self::String(s) | Self::Enum(s) => s.clone(),
                        other => other.to_string(),
                    };
                    object.insert(key, value.to_json()?);
                }
                Json::Object(object)
            }
        })
    }
}

fn finite_number(v: f64) -> Result<serde_json::Value> {
    serde_json::Number::from_f64(v)
        .map(serde_json::Value::Number)
        .ok_or_else(|| Error::unsupported_value(format!("float {v} has no JSON representation")))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::UInt8(v) => write!(f, "{v}"),
            Self::UInt16(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::UInt64(v) => write!(f, "{v}"),
            Self::UInt128(v) => write!(f, "{v}"),
            Self::UInt256(v) => write!(f, "{v}"),
            Self::Int8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Int128(v) => write!(f, "{v}"),
            Self::Int256(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::String(s) | Self::Enum(s) => f.write_str(s),
            Self::Uuid(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Self::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S%.f")),
            Self::Ipv4(v) => write!(f, "{v}"),
            Self::Ipv6(v) => write!(f, "{v}"),
            Self::Array(items) => write_items(f, '[', items, ']'),
            Self::Tuple(items) => write_items(f, '(', items, ')'),
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, open: char, items: &[Value], close: char) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    u64 => UInt64,
    u128 => UInt128,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    i128 => Int128,
    f32 => Float32,
    f64 => Float64,
    BigDecimal => Decimal,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveDateTime => DateTime,
    Ipv4Addr => Ipv4,
    Ipv6Addr => Ipv6,
}
