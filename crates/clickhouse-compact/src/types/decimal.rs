//! Fixed-point decimal handling with precision and scale validation.
//!
//! Handles `Decimal(P, S)` and the `Decimal32/64/128/256(S)` shorthands. Wire
//! values are parsed from their original text into [`BigDecimal`], never
//! through a binary float.

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_traits::Zero;

use crate::{Error, Result};

/// Validated decimal precision and scale.
///
/// Ensures precision and scale are valid at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecimalSpec {
    precision: u8,
    scale: u8,
}

impl DecimalSpec {
    /// Largest precision the server supports (`Decimal256`).
    pub const MAX_PRECISION: u8 = 76;

    /// Create a decimal spec from declaration literals.
    ///
    /// # Errors
    ///
    /// Returns an invalid type arguments error unless
    /// `1 <= precision <= 76` and `0 <= scale <= precision`.
    pub fn new(precision: i64, scale: i64) -> Result<Self> {
        let precision = u8::try_from(precision)
            .ok()
            .filter(|p| (1..=Self::MAX_PRECISION).contains(p))
            .ok_or_else(|| {
                Error::invalid_type_arguments(
                    "Decimal",
                    format!(
                        "precision must be between 1 and {}, got {precision}",
                        Self::MAX_PRECISION
                    ),
                )
            })?;
        let scale = u8::try_from(scale)
            .ok()
            .filter(|s| *s <= precision)
            .ok_or_else(|| {
                Error::invalid_type_arguments(
                    "Decimal",
                    format!("scale must be between 0 and {precision}, got {scale}"),
                )
            })?;
        Ok(Self { precision, scale })
    }

    /// Spec for a fixed-width shorthand such as `Decimal64(S)`.
    ///
    /// # Errors
    ///
    /// Returns an invalid type arguments error naming `type_name` when the
    /// scale does not fit the width's precision.
    pub fn with_width(type_name: &str, precision: u8, scale: i64) -> Result<Self> {
        Self::new(i64::from(precision), scale).map_err(|_| {
            Error::invalid_type_arguments(
                type_name,
                format!("scale must be between 0 and {precision}, got {scale}"),
            )
        })
    }

    /// Returns the precision value.
    #[must_use]
    pub const fn precision(&self) -> u8 {
        self.precision
    }

    /// Returns the scale value.
    #[must_use]
    pub const fn scale(&self) -> u8 {
        self.scale
    }

    /// Parse decimal text and rescale it to this spec.
    ///
    /// Accepts a JSON number (kept as its original text) or a string.
    ///
    /// # Errors
    ///
    /// Returns a decode error when the text is not a decimal, carries more
    /// significant fractional digits than the scale, or has more digits than
    /// the precision allows.
    pub fn decode(&self, wire: &serde_json::Value) -> Result<BigDecimal> {
        let owned;
        let text = match wire {
            serde_json::Value::Number(n) => {
                owned = n.to_string();
                owned.as_str()
            }
            serde_json::Value::String(s) => s.as_str(),
            _ => return Err(self.error(wire, "expected a number or numeric string")),
        };

        let parsed = BigDecimal::from_str(text.trim())
            .map_err(|e| self.error(wire, format!("invalid decimal: {e}")))?;
        let scale = i64::from(self.scale);
        if parsed.is_zero() {
            return Ok(BigDecimal::zero().with_scale(scale));
        }

        // Strip trailing zeros by hand: bounds are checked on the mantissa
        // and exponent so that an extreme exponent is never materialised.
        let (mut mantissa, mut exponent) = parsed.into_bigint_and_exponent();
        while (&mantissa % 10_u32).is_zero() {
            mantissa /= 10_u32;
            exponent -= 1;
        }
        if exponent > scale {
            return Err(self.error(
                wire,
                format!("more than {} fractional digits", self.scale),
            ));
        }
        let value = BigDecimal::new(mantissa, exponent);
        let integral_digits = i128::from(value.digits()) - i128::from(exponent);
        if integral_digits > i128::from(self.precision - self.scale) {
            return Err(self.error(
                wire,
                format!(
                    "more than {} significant digits ({} before the decimal point)",
                    self.precision,
                    self.precision - self.scale
                ),
            ));
        }
        Ok(value.with_scale(scale))
    }

    fn error(&self, wire: &serde_json::Value, message: impl Into<String>) -> Error {
        Error::decode_value(self.to_string(), wire, message)
    }
}

impl fmt::Display for DecimalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal({}, {})", self.precision, self.scale)
    }
}
