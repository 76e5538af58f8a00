//! Typed cell values.
//!
//! A literal token is classified as an integer if and only if it is a
//! non-empty run of ASCII digits, optionally preceded by a single `-`.
//! Everything else is text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Signed 64-bit integer, persisted as `INT`.
    Int,
    /// Free-form text, persisted as `STRING`.
    Text,
}

impl DataType {
    /// Returns the keyword used in table files.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Int => "INT",
            DataType::Text => "STRING",
        }
    }

    /// Maps a type word from a CREATE command.
    ///
    /// `INT` and `INTEGER` select [`DataType::Int`]; every other word selects
    /// [`DataType::Text`].
    pub fn from_type_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "INT" | "INTEGER" => DataType::Int,
            _ => DataType::Text,
        }
    }

    /// Converts a literal into a value of this type.
    ///
    /// Returns `None` when the literal is not acceptable for the type: an
    /// integer column only takes integer literals that fit in an `i64`.
    pub fn coerce(&self, literal: &str) -> Option<Value> {
        match self {
            DataType::Int => parse_integer_literal(literal).map(Value::Integer),
            DataType::Text => Some(Value::Text(literal.to_string())),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = String;

    /// Parses the strict on-disk keyword (`INT` or `STRING`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INT" => Ok(DataType::Int),
            "STRING" => Ok(DataType::Text),
            other => Err(format!("unknown column type '{}'", other)),
        }
    }
}

/// Returns true if `s` is a non-empty decimal digit string with an optional
/// leading `-`.
pub fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Parses an integer literal.
///
/// Returns `None` if the literal does not classify as an integer or does not
/// fit in an `i64`.
pub fn parse_integer_literal(s: &str) -> Option<i64> {
    if is_integer_literal(s) {
        s.parse().ok()
    } else {
        None
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// 64-bit signed integer.
    Integer(i64),
    /// Text value.
    Text(String),
}

impl Value {
    /// Creates an integer value.
    pub fn integer(v: i64) -> Self {
        Value::Integer(v)
    }

    /// Creates a text value.
    pub fn text(v: impl Into<String>) -> Self {
        Value::Text(v.into())
    }

    /// Returns the data type of this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Integer(_) => DataType::Int,
            Value::Text(_) => DataType::Text,
        }
    }

    /// Returns the value as an integer if it classifies as one.
    ///
    /// Text cells that hold an integer literal (e.g. `"25"`) also classify.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Text(s) => parse_integer_literal(s),
        }
    }

    /// Returns the text payload, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Integer(_) => None,
        }
    }

    /// Returns true if the value can be written to a table file unchanged.
    ///
    /// Commas separate cells and line breaks separate rows, and the file
    /// format has no escaping.
    pub fn is_storable(&self) -> bool {
        match self {
            Value::Integer(_) => true,
            Value::Text(s) => !s.contains([',', '\n', '\r']),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::Text(s) => f.write_str(s),
        }
    }
}
