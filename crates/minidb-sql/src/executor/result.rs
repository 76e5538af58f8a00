//! Statement results.

use std::fmt;

use crate::types::{DataType, Row};

/// Rows produced by a SELECT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    /// Selected column names, in output order.
    pub columns: Vec<String>,
    /// Selected column types, parallel to `columns`.
    pub column_types: Vec<DataType>,
    /// Matching rows in storage order.
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no row matched.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the tab-separated header line.
    pub fn header(&self) -> String {
        self.columns.join("\t")
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header())?;
        for row in &self.rows {
            write!(f, "\n{}", row)?;
        }
        Ok(())
    }
}

/// Outcome of one executed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementResult {
    /// Table created.
    Created {
        /// Table name.
        table: String,
    },
    /// One row inserted.
    Inserted {
        /// Table name.
        table: String,
    },
    /// SELECT output.
    Query(QueryResult),
    /// Rows changed by UPDATE.
    Updated {
        /// Table name.
        table: String,
        /// Number of rows changed.
        count: usize,
    },
    /// Rows removed by DELETE.
    Deleted {
        /// Table name.
        table: String,
        /// Number of rows removed.
        count: usize,
    },
    /// Table dropped.
    Dropped {
        /// Table name.
        table: String,
    },
}

impl StatementResult {
    /// Returns the query output, if this is a SELECT result.
    pub fn as_query(&self) -> Option<&QueryResult> {
        match self {
            StatementResult::Query(q) => Some(q),
            _ => None,
        }
    }

    /// Returns the affected row count for UPDATE and DELETE.
    pub fn rows_affected(&self) -> Option<usize> {
        match self {
            StatementResult::Updated { count, .. } | StatementResult::Deleted { count, .. } => {
                Some(*count)
            }
            _ => None,
        }
    }
}

impl fmt::Display for StatementResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementResult::Created { table } => write!(f, "[OK] Created {}", table),
            StatementResult::Inserted { table } => write!(f, "[OK] Inserted into {}", table),
            StatementResult::Query(q) => write!(f, "{}", q),
            StatementResult::Updated { count, .. } => write!(f, "[OK] UPDATE changed: {}", count),
            StatementResult::Deleted { count, .. } => write!(f, "[OK] DELETE removed: {}", count),
            StatementResult::Dropped { table } => {
                write!(f, "Table '{}' dropped successfully.", table)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn test_status_lines() {
        let t = || "students".to_string();
        assert_eq!(StatementResult::Created { table: t() }.to_string(), "[OK] Created students");
        assert_eq!(
            StatementResult::Inserted { table: t() }.to_string(),
            "[OK] Inserted into students"
        );
        assert_eq!(
            StatementResult::Updated { table: t(), count: 1 }.to_string(),
            "[OK] UPDATE changed: 1"
        );
        assert_eq!(
            StatementResult::Deleted { table: t(), count: 0 }.to_string(),
            "[OK] DELETE removed: 0"
        );
        assert_eq!(
            StatementResult::Dropped { table: t() }.to_string(),
            "Table 'students' dropped successfully."
        );
    }

    #[test]
    fn test_query_rendering() {
        let q = QueryResult {
            columns: vec!["name".into(), "age".into()],
            column_types: vec![DataType::Text, DataType::Int],
            rows: vec![
                Row::new(vec![Value::text("Omar"), Value::integer(22)]),
                Row::new(vec![Value::text("Sara"), Value::integer(25)]),
            ],
        };
        assert_eq!(q.row_count(), 2);
        assert_eq!(
            StatementResult::Query(q).to_string(),
            "name\tage\nOmar\t22\nSara\t25"
        );
    }
}
