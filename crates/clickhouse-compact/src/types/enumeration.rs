//! `Enum8` and `Enum16` label sets.

use std::collections::HashMap;
use std::fmt;

use crate::grammar::write_quoted;
use crate::{Error, Result};

/// Storage width of an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumWidth {
    /// `Enum8`, ordinals in `i8`.
    Enum8,
    /// `Enum16`, ordinals in `i16`.
    Enum16,
}

impl EnumWidth {
    /// Type name as declared.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Enum8 => "Enum8",
            Self::Enum16 => "Enum16",
        }
    }

    fn ordinal(self, value: i64) -> Option<i16> {
        match self {
            Self::Enum8 => i8::try_from(value).ok().map(i16::from),
            Self::Enum16 => i16::try_from(value).ok(),
        }
    }
}

/// Validated mapping between enum labels and ordinals.
///
/// Entries keep declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    width: EnumWidth,
    entries: Vec<(String, i16)>,
    by_label: HashMap<String, i16>,
}

impl EnumSpec {
    /// Build a label set from declared `(label, ordinal)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an invalid type arguments error when there are no pairs, an
    /// ordinal does not fit the width, or a label or ordinal repeats.
    pub fn new(width: EnumWidth, pairs: impl IntoIterator<Item = (String, i64)>) -> Result<Self> {
        let name = width.name();
        let mut entries = Vec::new();
        let mut by_label = HashMap::new();

        for (label, value) in pairs {
            let ordinal = width.ordinal(value).ok_or_else(|| {
                Error::invalid_type_arguments(
                    name,
                    format!("ordinal {value} of '{label}' is out of range"),
                )
            })?;
            if entries.iter().any(|(_, existing)| *existing == ordinal) {
                return Err(Error::invalid_type_arguments(
                    name,
                    format!("duplicate ordinal {ordinal}"),
                ));
            }
            if by_label.insert(label.clone(), ordinal).is_some() {
                return Err(Error::invalid_type_arguments(
                    name,
                    format!("duplicate label '{label}'"),
                ));
            }
            entries.push((label, ordinal));
        }

        if entries.is_empty() {
            return Err(Error::invalid_type_arguments(
                name,
                "at least one 'label' = ordinal pair is required",
            ));
        }

        Ok(Self {
            width,
            entries,
            by_label,
        })
    }

    /// Storage width.
    #[must_use]
    pub const fn width(&self) -> EnumWidth {
        self.width
    }

    /// `(label, ordinal)` pairs in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[(String, i16)] {
        &self.entries
    }

    /// Ordinal of a label, if it belongs to the set.
    #[must_use]
    pub fn ordinal(&self, label: &str) -> Option<i16> {
        self.by_label.get(label).copied()
    }

    /// Label of an ordinal, if it belongs to the set.
    #[must_use]
    pub fn label(&self, ordinal: i16) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, value)| *value == ordinal)
            .map(|(label, _)| label.as_str())
    }

    /// Check that a wire value is one of the labels.
    pub(crate) fn decode(&self, wire: &serde_json::Value) -> Result<String> {
        let label = wire
            .as_str()
            .ok_or_else(|| Error::decode_value(self.to_string(), wire, "expected a label string"))?;
        if self.by_label.contains_key(label) {
            Ok(label.to_owned())
        } else {
            Err(Error::decode_value(
                self.to_string(),
                wire,
                "label is not part of the enum",
            ))
        }
    }
}

impl fmt::Display for EnumSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.width.name())?;
        for (i, (label, ordinal)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_quoted(f, label)?;
            write!(f, " = {ordinal}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn pairs(items: &[(&str, i64)]) -> Vec<(String, i64)> {
        items.iter().map(|(l, o)| ((*l).to_owned(), *o)).collect()
    }

    #[test]
    fn test_enum_spec_lookup() {
        let spec = EnumSpec::new(EnumWidth::Enum8, pairs(&[("", 0), ("ONE", 1), ("TWO", 2)])).unwrap();
        assert_eq!(spec.ordinal("ONE"), Some(1));
        assert_eq!(spec.label(2), Some("TWO"));
        assert_eq!(spec.ordinal("THREE"), None);
        assert_eq!(spec.entries().len(), 3);
    }

    #[test]
    fn test_enum8_range() {
        assert!(EnumSpec::new(EnumWidth::Enum8, pairs(&[("a", -128), ("b", 127)])).is_ok());
        let err = EnumSpec::new(EnumWidth::Enum8, pairs(&[("a", 128)])).unwrap_err();
        assert!(err.is_invalid_type_arguments());
        assert!(EnumSpec::new(EnumWidth::Enum16, pairs(&[("a", 128)])).is_ok());
        assert!(EnumSpec::new(EnumWidth::Enum16, pairs(&[("a", 32768)])).is_err());
    }

    #[test]
    fn test_duplicates_rejected() {
        let err = EnumSpec::new(EnumWidth::Enum8, pairs(&[("a", 1), ("b", 1)])).unwrap_err();
        assert!(err.to_string().contains("duplicate ordinal"));
        let err = EnumSpec::new(EnumWidth::Enum8, pairs(&[("a", 1), ("a", 2)])).unwrap_err();
        assert!(err.to_string().contains("duplicate label"));
    }

    #[test]
    fn test_empty_rejected() {
        assert!(EnumSpec::new(EnumWidth::Enum16, Vec::new()).is_err());
    }

    #[test]
    fn test_decode() {
        let spec = EnumSpec::new(EnumWidth::Enum8, pairs(&[("", 0), ("ONE", 1)])).unwrap();
        assert_eq!(spec.decode(&json!("ONE")).unwrap(), "ONE");
        assert_eq!(spec.decode(&json!("")).unwrap(), "");
        assert!(spec.decode(&json!("TWO")).unwrap_err().is_decode_value());
        assert!(spec.decode(&json!(1)).is_err());
    }

    #[test]
    fn test_display() {
        let spec = EnumSpec::new(EnumWidth::Enum8, pairs(&[("it's", -1), ("b", 2)])).unwrap();
        assert_eq!(spec.to_string(), r"Enum8('it\'s' = -1, 'b' = 2)");
    }
}
