//! Sealed trait pattern for typed extraction of decoded values.
//!
//! External code can USE [`FromValue`] but CANNOT implement it. This keeps
//! the set of conversions closed so that methods can be added without
//! breaking downstream crates.
//!
//! # Pattern
//!
//! ```rust,ignore
//! mod private {
//!     pub trait Sealed {}
//! }
//!
//! pub trait MyPublicTrait: private::Sealed {
//!     fn method(&self);
//! }
//! ```

use std::net::{Ipv4Addr, Ipv6Addr};

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::types::Value;
use crate::{Error, Result};

/// Private module that external crates cannot access.
pub(crate) mod private {
    /// Marker trait that seals the public traits.
    pub trait Sealed {}
}

/// Rust types a decoded [`Value`] can be extracted into.
///
/// Integer conversions only widen: a `UInt8` column can be read as `u8`,
/// `u16`, `i16` and so on, but an `Int64` column is never narrowed.
///
/// # Sealed
///
/// This trait requires implementing [`private::Sealed`], which is not
/// accessible outside this crate.
pub trait FromValue: private::Sealed + Sized {
    /// Convert a decoded value of column `column`.
    ///
    /// # Errors
    ///
    /// Returns a value conversion error naming `column` when the value's
    /// type does not convert losslessly.
    fn from_value(value: &Value, column: &str) -> Result<Self>;
}

fn mismatch(target: &str, value: &Value, column: &str) -> Error {
    Error::value_conversion(
        column,
        format!("cannot read {} value as {target}", value.kind_name()),
    )
}

// ═══════════════════════════════════════════════════════════════════════════
// Sealed Implementations for Primitive Types
// ═══════════════════════════════════════════════════════════════════════════

macro_rules! impl_widening {
    ($target:ty => $($variant:ident),+) => {
        impl private::Sealed for $target {}
        impl FromValue for $target {
            fn from_value(value: &Value, column: &str) -> Result<Self> {
                match value {
                    $(Value::$variant(v) => Ok(Self::from(*v)),)+
                    other => Err(mismatch(stringify!($target), other, column)),
                }
            }
        }
    };
}

impl_widening!(u8 => UInt8);
impl_widening!(u16 => UInt8, UInt16);
impl_widening!(u32 => UInt8, UInt16, UInt32);
impl_widening!(u64 => UInt8, UInt16, UInt32, UInt64);
impl_widening!(u128 => UInt8, UInt16, UInt32, UInt64, UInt128);
impl_widening!(i8 => Int8);
impl_widening!(i16 => Int8, Int16, UInt8);
impl_widening!(i32 => Int8, Int16, Int32, UInt8, UInt16);
impl_widening!(i64 => Int8, Int16, Int32, Int64, UInt8, UInt16, UInt32);
impl_widening!(i128 => Int8, Int16, Int32, Int64, Int128, UInt8, UInt16, UInt32, UInt64);
impl_widening!(f32 => Float32);
impl_widening!(f64 => Float32, Float64);
impl_widening!(bool => Bool);

macro_rules! impl_clone {
    ($target:ty => $($variant:ident),+) => {
        impl private::Sealed for $target {}
        impl FromValue for $target {
            fn from_value(value: &Value, column: &str) -> Result<Self> {
                match value {
                    $(Value::$variant(v) => Ok(v.clone()),)+
                    other => Err(mismatch(stringify!($target), other, column)),
                }
            }
        }
    };
}

impl_clone!(String => String, Enum);
impl_clone!(BigDecimal => Decimal);
impl_clone!(NaiveDate => Date);
impl_clone!(NaiveDateTime => DateTime);
impl_clone!(Ipv4Addr => Ipv4);
impl_clone!(Ipv6Addr => Ipv6);
impl_clone!(Uuid => Uuid);

// ═══════════════════════════════════════════════════════════════════════════
// Composite Implementations
// ═══════════════════════════════════════════════════════════════════════════

impl private::Sealed for Value {}
impl FromValue for Value {
    fn from_value(value: &Value, _column: &str) -> Result<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> private::Sealed for Option<T> {}
impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value, column: &str) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other, column).map(Some),
        }
    }
}

impl<T: FromValue> private::Sealed for Vec<T> {}
impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value, column: &str) -> Result<Self> {
        match value {
            Value::Array(items) => items.iter().map(|item| T::from_value(item, column)).collect(),
            other => Err(mismatch("Vec", other, column)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_integer_widening() {
        assert_eq!(u8::from_value(&Value::UInt8(7), "c").unwrap(), 7);
        assert_eq!(u64::from_value(&Value::UInt8(7), "c").unwrap(), 7);
        assert_eq!(i16::from_value(&Value::UInt8(255), "c").unwrap(), 255);
        assert_eq!(i64::from_value(&Value::Int32(-3), "c").unwrap(), -3);
        assert_eq!(
            i128::from_value(&Value::UInt64(u64::MAX), "c").unwrap(),
            i128::from(u64::MAX)
        );
    }

    #[test]
    fn test_integer_narrowing_rejected() {
        let err = u8::from_value(&Value::UInt16(1), "n").unwrap_err();
        assert!(err.is_value_conversion());
        assert_eq!(err.column(), Some("n"));
        assert!(i64::from_value(&Value::UInt64(1), "n").is_err());
        assert!(u32::from_value(&Value::Int8(1), "n").is_err());
    }

    #[test]
    fn test_float() {
        assert_eq!(f64::from_value(&Value::Float32(0.5), "f").unwrap(), 0.5);
        assert!(f32::from_value(&Value::Float64(0.5), "f").is_err());
    }

    #[test]
    fn test_string_and_enum() {
        assert_eq!(
            String::from_value(&Value::from("a"), "s").unwrap(),
            "a".to_owned()
        );
        assert_eq!(
            String::from_value(&Value::Enum("ONE".into()), "e").unwrap(),
            "ONE".to_owned()
        );
        assert!(String::from_value(&Value::UInt8(1), "s").is_err());
    }

    #[test]
    fn test_decimal() {
        let decimal = BigDecimal::from_str("1.23").unwrap();
        assert_eq!(
            BigDecimal::from_value(&Value::Decimal(decimal.clone()), "d").unwrap(),
            decimal
        );
    }

    #[test]
    fn test_option() {
        assert_eq!(Option::<u8>::from_value(&Value::Null, "c").unwrap(), None);
        assert_eq!(
            Option::<u8>::from_value(&Value::UInt8(1), "c").unwrap(),
            Some(1)
        );
        assert!(u8::from_value(&Value::Null, "c").is_err());
    }

    #[test]
    fn test_vec() {
        let value = Value::Array(vec![Value::from("a"), Value::Null]);
        assert_eq!(
            Vec::<Option<String>>::from_value(&value, "c").unwrap(),
            vec![Some("a".to_owned()), None]
        );
        assert!(Vec::<String>::from_value(&value, "c").is_err());
        assert!(Vec::<u8>::from_value(&Value::UInt8(1), "c").is_err());
    }
}
