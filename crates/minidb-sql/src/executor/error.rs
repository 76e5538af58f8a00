//! Execution error types.

use thiserror::Error;

use crate::storage::StorageError;
use crate::types::DataType;

/// Errors raised while validating or executing a statement.
#[derive(Debug, Error)]
#[allow(missing_docs)] // Fields are documented by variant docs
pub enum ExecutionError {
    /// Column name not present in the table schema.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// Literal not acceptable for the target column type.
    #[error("value '{value}' is not {expected} for column {column}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        value: String,
    },

    /// Statement descriptor failed structural validation.
    #[error("malformed command: {0}")]
    MalformedCommand(String),

    /// Operator pulled before `open()` or after `close()`.
    #[error("{0} operator is not open")]
    NotOpen(&'static str),

    /// Row mutation with no row under the cursor.
    #[error("{0} operator has no current row")]
    NoCurrentRow(&'static str),

    /// Row mutation routed through a read-only operator.
    #[error("{0} operator does not support row updates")]
    ReadOnly(&'static str),

    /// Storage layer failure.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Execution result type.
pub type ExecutionResult<T> = Result<T, ExecutionError>;
