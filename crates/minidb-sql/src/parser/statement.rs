//! Statement representation.
//!
//! This module defines the command descriptors produced by the parser and
//! consumed by the executor. Identifiers are already trimmed and lowercased;
//! literal values are kept verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::DataType;

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statement {
    /// CREATE TABLE statement.
    CreateTable {
        /// Table name.
        table: String,
        /// Column definitions in declaration order.
        columns: Vec<ColumnSpec>,
    },
    /// INSERT statement.
    Insert {
        /// Table name.
        table: String,
        /// One literal per column.
        values: Vec<String>,
    },
    /// SELECT query.
    Select {
        /// Table name.
        table: String,
        /// Selected columns.
        projection: Projection,
        /// Optional WHERE clause.
        filter: Option<WhereClause>,
    },
    /// UPDATE statement.
    Update {
        /// Table name.
        table: String,
        /// SET clause.
        assignment: Assignment,
        /// Optional WHERE clause.
        filter: Option<WhereClause>,
    },
    /// DELETE statement.
    Delete {
        /// Table name.
        table: String,
        /// Optional WHERE clause.
        filter: Option<WhereClause>,
    },
    /// DROP TABLE statement.
    DropTable {
        /// Table name.
        table: String,
    },
}

impl Statement {
    /// Returns the target table name.
    pub fn table(&self) -> &str {
        match self {
            Statement::CreateTable { table, .. }
            | Statement::Insert { table, .. }
            | Statement::Select { table, .. }
            | Statement::Update { table, .. }
            | Statement::Delete { table, .. }
            | Statement::DropTable { table } => table,
        }
    }

    /// Returns the command keyword.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::CreateTable { .. } => "CREATE",
            Statement::Insert { .. } => "INSERT",
            Statement::Select { .. } => "SELECT",
            Statement::Update { .. } => "UPDATE",
            Statement::Delete { .. } => "DELETE",
            Statement::DropTable { .. } => "DROP",
        }
    }

    /// Returns true if the statement never modifies data.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Statement::Select { .. })
    }
}

/// A column definition in CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,
    /// Column type.
    pub data_type: DataType,
}

impl ColumnSpec {
    /// Creates a column definition.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// SELECT column list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    /// `*`: every column in schema order.
    All,
    /// Named columns in output order. Names may repeat.
    Columns(Vec<String>),
}

/// A single `column op value` comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhereClause {
    /// Compared column.
    pub column: String,
    /// Operator text, validated by the executor.
    pub operator: String,
    /// Literal operand.
    pub value: String,
}

impl WhereClause {
    /// Creates a WHERE clause.
    pub fn new(
        column: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// `SET column = value` clause of an UPDATE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Target column.
    pub column: String,
    /// New value literal.
    pub value: String,
}

impl Assignment {
    /// Creates an assignment.
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

// =============================================================================
// Display
// =============================================================================

/// Renders a literal so that it parses back to the same text.
fn write_literal(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    let plain = !value.is_empty()
        && !value.chars().any(|c| {
            c.is_whitespace() || matches!(c, '\'' | '(' | ')' | ',' | '=' | '<' | '>' | '!' | ';')
        });
    if plain {
        f.write_str(value)
    } else {
        write!(f, "'{}'", value.replace('\'', "''"))
    }
}

impl fmt::Display for WhereClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.column, self.operator)?;
        write_literal(f, &self.value)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::CreateTable { table, columns } => {
                write!(f, "CREATE TABLE {} (", table)?;
                for (i, c) in columns.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} {}", c.name, c.data_type)?;
                }
                f.write_str(")")
            }
            Statement::Insert { table, values } => {
                write!(f, "INSERT INTO {} VALUES (", table)?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_literal(f, v)?;
                }
                f.write_str(")")
            }
            Statement::Select {
                table,
                projection,
                filter,
            } => {
                f.write_str("SELECT ")?;
                match projection {
                    Projection::All => f.write_str("*")?,
                    Projection::Columns(cols) => f.write_str(&cols.join(", "))?,
                }
                write!(f, " FROM {}", table)?;
                if let Some(w) = filter {
                    write!(f, " WHERE {}", w)?;
                }
                Ok(())
            }
            Statement::Update {
                table,
                assignment,
                filter,
            } => {
                write!(f, "UPDATE {} SET {} = ", table, assignment.column)?;
                write_literal(f, &assignment.value)?;
                if let Some(w) = filter {
                    write!(f, " WHERE {}", w)?;
                }
                Ok(())
            }
            Statement::Delete { table, filter } => {
                write!(f, "DELETE FROM {}", table)?;
                if let Some(w) = filter {
                    write!(f, " WHERE {}", w)?;
                }
                Ok(())
            }
            Statement::DropTable { table } => write!(f, "DROP TABLE {}", table),
        }
    }
}
