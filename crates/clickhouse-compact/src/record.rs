//! Decoded rows.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use crate::traits::FromValue;
use crate::types::Value;
use crate::{Error, Result};

/// One decoded row: ordered `(name, value)` pairs in server column order.
///
/// Column names may repeat; name lookup returns the first match. Names are
/// shared by every record of a response.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    names: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    /// Build a record from shared column names and one value per column.
    ///
    /// # Panics
    ///
    /// Panics if `names` and `values` differ in length.
    #[must_use]
    pub fn new(names: Arc<[String]>, values: Vec<Value>) -> Self {
        assert_eq!(
            names.len(),
            values.len(),
            "record needs exactly one value per column"
        );
        Self { names, values }
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true for a record without columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Column names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Values in column order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value at position `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value of the first column called `name`.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.position(name).map(|index| &self.values[index])
    }

    /// Position of the first column called `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Extract the value at `index` as `T`.
    ///
    /// # Errors
    ///
    /// Returns a value conversion error when the index is out of bounds or
    /// the value does not convert.
    pub fn get_as<T: FromValue>(&self, index: usize) -> Result<T> {
        let (name, value) = self
            .names
            .get(index)
            .zip(self.values.get(index))
            .ok_or_else(|| {
                Error::value_conversion(
                    format!("#{index}"),
                    format!("record has {} columns", self.len()),
                )
            })?;
        T::from_value(value, name)
    }

    /// Extract the value of the first column called `name` as `T`.
    ///
    /// # Errors
    ///
    /// Returns a value conversion error when there is no such column or the
    /// value does not convert.
    pub fn get_by_name_as<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self
            .get_by_name(name)
            .ok_or_else(|| Error::value_conversion(name, "no such column"))?;
        T::from_value(value, name)
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Take the values out of the record.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Render as a JSON object.
    ///
    /// A repeated column name keeps its first position and its last value.
    ///
    /// # Errors
    ///
    /// Returns an unsupported value error for values without a JSON form.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut object = serde_json::Map::with_capacity(self.len());
        for (name, value) in self.iter() {
            object.insert(name.to_owned(), value.to_json()?);
        }
        Ok(serde_json::Value::Object(object))
    }
}

impl Index<usize> for Record {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.values[index]
    }
}

impl Index<&str> for Record {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        match self.get_by_name(name) {
            Some(value) => value,
            None => panic!("no column named '{name}'"),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<Record")?;
        for (name, value) in self.iter() {
            write!(f, " {name}={value}")?;
        }
        f.write_str(">")
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a str, &'a Value);
    type IntoIter = Box<dyn ExactSizeIterator<Item = (&'a str, &'a Value)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
