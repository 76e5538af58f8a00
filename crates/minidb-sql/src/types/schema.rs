//! Table schemas.
//!
//! A schema is an ordered list of columns fixed at table creation. Column
//! names are stored lowercased and looked up case-insensitively.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DataType, Row};
use crate::storage::{StorageError, StorageResult};

/// A column in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Column name (lowercase).
    pub name: String,
    /// Data type.
    pub data_type: DataType,
}

impl Column {
    /// Creates a new column. The name is trimmed and lowercased.
    pub fn new(name: impl AsRef<str>, data_type: DataType) -> Self {
        Self {
            name: normalize(name.as_ref()),
            data_type,
        }
    }

    /// Creates an integer column.
    pub fn int(name: impl AsRef<str>) -> Self {
        Self::new(name, DataType::Int)
    }

    /// Creates a text column.
    pub fn text(name: impl AsRef<str>) -> Self {
        Self::new(name, DataType::Text)
    }

    /// Returns the column name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)
    }
}

/// An ordered, duplicate-free list of columns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Creates a schema.
    ///
    /// Fails if the column list is empty, if a column name is not a valid
    /// identifier, or if a name repeats an earlier one.
    pub fn new(columns: Vec<Column>) -> StorageResult<Self> {
        if columns.is_empty() {
            return Err(StorageError::EmptySchema);
        }

        for (i, column) in columns.iter().enumerate() {
            if !is_valid_column_name(&column.name) {
                return Err(StorageError::InvalidName(column.name.clone()));
            }
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(StorageError::DuplicateColumn(column.name.clone()));
            }
        }

        Ok(Self { columns })
    }

    /// Creates a schema with no columns.
    ///
    /// Used for tables whose backing file has not been read yet.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column at the given position.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Returns the column names in order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Finds a column position by name, ignoring case and surrounding
    /// whitespace.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        let want = normalize(name);
        self.columns.iter().position(|c| c.name == want)
    }

    /// Checks that a row fits this schema: same width, matching cell types,
    /// and text that the table file can hold.
    pub fn validate_row(&self, row: &Row) -> StorageResult<()> {
        if row.num_columns() != self.columns.len() {
            return Err(StorageError::RowShapeMismatch {
                expected: self.columns.len(),
                actual: row.num_columns(),
            });
        }

        for (column, value) in self.columns.iter().zip(row.iter()) {
            if value.data_type() != column.data_type {
                return Err(StorageError::TypeMismatch {
                    column: column.name.clone(),
                    expected: column.data_type,
                    value: value.to_string(),
                });
            }
            if !value.is_storable() {
                return Err(StorageError::UnsupportedText {
                    column: column.name.clone(),
                });
            }
        }

        Ok(())
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", column)?;
        }
        write!(f, ")")
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Column names end up as whitespace-separated words in the table file.
fn is_valid_column_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(|c: char| c.is_whitespace() || c == ',')
}
