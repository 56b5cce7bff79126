//! Text-first parsing of scalar wire values.
//!
//! Numbers arrive with their original text preserved, so every numeric type
//! is parsed from that text into its declared width. No value passes
//! through an intermediate binary float.

use std::borrow::Cow;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use num_bigint::{BigInt, BigUint};
use num_traits::{One, Signed};
use serde_json::Value as Json;
use uuid::Uuid;

use crate::{Error, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATETIME64_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Text of a number or string wire value.
fn numeric_text<'v>(expected: &str, wire: &'v Json) -> Result<Cow<'v, str>> {
    match wire {
        Json::Number(n) => Ok(Cow::Owned(n.to_string())),
        Json::String(s) => Ok(Cow::Borrowed(s.trim())),
        _ => Err(Error::decode_value(
            expected,
            wire,
            "expected a number or numeric string",
        )),
    }
}

fn string_text<'v>(expected: &str, wire: &'v Json) -> Result<&'v str> {
    wire.as_str()
        .ok_or_else(|| Error::decode_value(expected, wire, "expected a string"))
}

/// Optional sign followed by at least one digit.
fn is_integer_literal(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parse an integer of a primitive width.
pub(crate) fn integer<T: FromStr>(expected: &str, wire: &Json) -> Result<T> {
    let text = numeric_text(expected, wire)?;
    text.parse::<T>().map_err(|_| {
        let message = if is_integer_literal(&text) {
            "integer out of range"
        } else {
            "invalid integer"
        };
        Error::decode_value(expected, wire, message)
    })
}

/// Parse a `UInt256`.
pub(crate) fn uint256(expected: &str, wire: &Json) -> Result<BigUint> {
    let text = numeric_text(expected, wire)?;
    if !is_integer_literal(&text) {
        return Err(Error::decode_value(expected, wire, "invalid integer"));
    }
    let value = BigInt::from_str(&text)
        .map_err(|_| Error::decode_value(expected, wire, "invalid integer"))?;
    value
        .to_biguint()
        .filter(|v| v.bits() <= 256)
        .ok_or_else(|| Error::decode_value(expected, wire, "integer out of range"))
}

/// Parse an `Int256`.
pub(crate) fn int256(expected: &str, wire: &Json) -> Result<BigInt> {
    let text = numeric_text(expected, wire)?;
    if !is_integer_literal(&text) {
        return Err(Error::decode_value(expected, wire, "invalid integer"));
    }
    let value = BigInt::from_str(&text)
        .map_err(|_| Error::decode_value(expected, wire, "invalid integer"))?;
    let limit = BigInt::one() << 255_u32;
    let fits = if value.is_negative() {
        value.abs() <= limit
    } else {
        value < limit
    };
    if fits {
        Ok(value)
    } else {
        Err(Error::decode_value(expected, wire, "integer out of range"))
    }
}

/// Parse a float from its text. `inf`, `-inf` and `nan` are accepted.
pub(crate) fn float<T: FromStr>(expected: &str, wire: &Json) -> Result<T> {
    let text = numeric_text(expected, wire)?;
    text.parse::<T>()
        .map_err(|_| Error::decode_value(expected, wire, "invalid floating point number"))
}

pub(crate) fn boolean(expected: &str, wire: &Json) -> Result<bool> {
    wire.as_bool()
        .ok_or_else(|| Error::decode_value(expected, wire, "expected true or false"))
}

pub(crate) fn string(expected: &str, wire: &Json) -> Result<String> {
    string_text(expected, wire).map(str::to_owned)
}

/// Decode a `FixedString(n)`, padding short values with `\0`.
pub(crate) fn fixed_string(expected: &str, wire: &Json, length: usize) -> Result<String> {
    let text = string_text(expected, wire)?;
    if text.len() > length {
        return Err(Error::decode_value(
            expected,
            wire,
            format!("{} bytes exceed the fixed length {length}", text.len()),
        ));
    }
    let mut padded = String::with_capacity(length);
    padded.push_str(text);
    padded.extend(std::iter::repeat_n('\0', length - text.len()));
    Ok(padded)
}

pub(crate) fn uuid(expected: &str, wire: &Json) -> Result<Uuid> {
    let text = string_text(expected, wire)?;
    Uuid::parse_str(text).map_err(|e| Error::decode_value(expected, wire, e.to_string()))
}

pub(crate) fn date(expected: &str, wire: &Json) -> Result<NaiveDate> {
    let text = string_text(expected, wire)?;
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|e| Error::decode_value(expected, wire, format!("invalid date: {e}")))
}

/// Parse `YYYY-MM-DD hh:mm:ss`, with a fractional part when `fractional`.
pub(crate) fn datetime(expected: &str, wire: &Json, fractional: bool) -> Result<NaiveDateTime> {
    let text = string_text(expected, wire)?;
    let format = if fractional {
        DATETIME64_FORMAT
    } else {
        DATETIME_FORMAT
    };
    NaiveDateTime::parse_from_str(text, format)
        .map_err(|e| Error::decode_value(expected, wire, format!("invalid date and time: {e}")))
}

pub(crate) fn ipv4(expected: &str, wire: &Json) -> Result<Ipv4Addr> {
    let text = string_text(expected, wire)?;
    text.parse()
        .map_err(|e| Error::decode_value(expected, wire, format!("{e}")))
}

pub(crate) fn ipv6(expected: &str, wire: &Json) -> Result<Ipv6Addr> {
    let text = string_text(expected, wire)?;
    text.parse()
        .map_err(|e| Error::decode_value(expected, wire, format!("{e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn number(text: &str) -> Json {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_integer_from_number_and_string() {
        assert_eq!(integer::<u8>("UInt8", &json!(255)).unwrap(), 255);
        assert_eq!(
            integer::<u64>("UInt64", &json!("18446744073709551615")).unwrap(),
            u64::MAX
        );
        assert_eq!(integer::<i8>("Int8", &json!(-128)).unwrap(), -128);
    }

    #[test]
    fn test_integer_out_of_range() {
        let err = integer::<u8>("UInt8", &json!(300)).unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");
        let err = integer::<u8>("UInt8", &json!(-1)).unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");
    }

    #[test]
    fn test_integer_rejects_non_integers() {
        assert!(integer::<u32>("UInt32", &number("1.5")).is_err());
        assert!(integer::<u32>("UInt32", &json!("abc")).is_err());
        assert!(integer::<u32>("UInt32", &json!(true)).is_err());
        assert!(integer::<u32>("UInt32", &json!(null)).is_err());
    }

    #[test]
    fn test_128_bit_integers() {
        let max = u128::MAX.to_string();
        assert_eq!(integer::<u128>("UInt128", &json!(max)).unwrap(), u128::MAX);
        let min = i128::MIN.to_string();
        assert_eq!(integer::<i128>("Int128", &number(&min)).unwrap(), i128::MIN);
    }

    #[test]
    fn test_256_bit_integers() {
        let max = (BigUint::one() << 256_u32) - BigUint::one();
        assert_eq!(uint256("UInt256", &json!(max.to_string())).unwrap(), max);
        let too_big = BigUint::one() << 256_u32;
        assert!(uint256("UInt256", &json!(too_big.to_string())).is_err());
        assert!(uint256("UInt256", &json!("-1")).is_err());

        let min = -(BigInt::one() << 255_u32);
        assert_eq!(int256("Int256", &json!(min.to_string())).unwrap(), min);
        let too_big = BigInt::one() << 255_u32;
        assert!(int256("Int256", &json!(too_big.to_string())).is_err());
    }

    #[test]
    fn test_float_text_first() {
        assert_eq!(float::<f64>("Float64", &number("1.23")).unwrap(), 1.23);
        assert_eq!(float::<f32>("Float32", &number("0.1")).unwrap(), 0.1_f32);
        assert_eq!(
            float::<f64>("Float64", &json!("inf")).unwrap(),
            f64::INFINITY
        );
        assert_eq!(
            float::<f64>("Float64", &json!("-inf")).unwrap(),
            f64::NEG_INFINITY
        );
        assert!(float::<f64>("Float64", &json!("nan")).unwrap().is_nan());
        assert!(float::<f64>("Float64", &json!("x")).is_err());
    }

    #[test]
    fn test_fixed_string_padding() {
        assert_eq!(fixed_string("FixedString(4)", &json!("ab"), 4).unwrap(), "ab\0\0");
        assert_eq!(fixed_string("FixedString(2)", &json!("ab"), 2).unwrap(), "ab");
        assert!(fixed_string("FixedString(2)", &json!("abc"), 2).is_err());
    }

    #[test]
    fn test_temporal() {
        let d = date("Date", &json!("2000-01-01")).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert!(date("Date", &json!("2000-13-01")).is_err());

        let dt = datetime("DateTime", &json!("2000-01-01 12:30:45"), false).unwrap();
        assert_eq!(dt, d.and_hms_opt(12, 30, 45).unwrap());

        let dt = datetime("DateTime64(3)", &json!("2000-01-01 12:30:45.125"), true).unwrap();
        assert_eq!(dt, d.and_hms_milli_opt(12, 30, 45, 125).unwrap());
        let dt = datetime("DateTime64(0)", &json!("2000-01-01 12:30:45"), true).unwrap();
        assert_eq!(dt, d.and_hms_opt(12, 30, 45).unwrap());
    }

    #[test]
    fn test_addresses_and_uuid() {
        assert_eq!(
            ipv4("IPv4", &json!("127.0.0.1")).unwrap(),
            Ipv4Addr::LOCALHOST
        );
        assert_eq!(ipv6("IPv6", &json!("::1")).unwrap(), Ipv6Addr::LOCALHOST);
        assert!(ipv4("IPv4", &json!("::1")).is_err());
        assert!(uuid("UUID", &json!("00000000-0000-0000-0000-000000000000"))
            .unwrap()
            .is_nil());
    }
}
