//! Storage error types.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::DataType;

/// Storage error type.
#[derive(Debug, Error)]
#[allow(missing_docs)] // Fields are documented by variant docs
pub enum StorageError {
    /// Table not found.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// A table with this name is already registered or persisted.
    #[error("table already exists: {0}")]
    TableAlreadyExists(String),

    /// Row width does not match the schema.
    #[error("column count mismatch: expected {expected} values, got {actual}")]
    RowShapeMismatch { expected: usize, actual: usize },

    /// Cell type does not match the column type.
    #[error("value '{value}' is not {expected} for column {column}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        value: String,
    },

    /// Text containing a separator the table file cannot represent.
    #[error("text for column {column} must not contain commas or line breaks")]
    UnsupportedText { column: String },

    /// Column name repeated within one schema.
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    /// Invalid table or column name.
    #[error("invalid name: '{0}'")]
    InvalidName(String),

    /// Schema without columns.
    #[error("a table needs at least one column")]
    EmptySchema,

    /// Column position outside the schema.
    #[error("column index {index} out of range for {width} columns")]
    ColumnOutOfRange { index: usize, width: usize },

    /// Table file that cannot be decoded.
    #[error("corrupted table file {path}: {reason}")]
    Corrupted { path: PathBuf, reason: String },

    /// Underlying I/O failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupted(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        StorageError::Corrupted {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Storage result type.
pub type StorageResult<T> = Result<T, StorageError>;
