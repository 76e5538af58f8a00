//! Table file encoding and decoding.
//!
//! Each table lives in one text file:
//!
//! ```text
//! <column_count>
//! <col1_name> <col1_type>
//! ...
//! <colN_name> <colN_type>
//! <row_number>,<cell1>,<cell2>,...,<cellN>
//! ...
//! ```
//!
//! Column types are the literal keywords `INT` and `STRING`. Row numbers are
//! 1-based, written for readability and ignored on load. Loading is
//! permissive: blank lines are skipped, and row lines with too few fields or
//! an unparsable integer cell are dropped with a warning. A malformed header
//! is a hard error.

use std::fmt::Write as _;
use std::path::Path;

use tracing::warn;

use crate::types::{parse_integer_literal, Column, DataType, Row, Schema, Value};

use super::error::{StorageError, StorageResult};

/// Field separator within a row line.
const FIELD_SEPARATOR: char = ',';

/// Contents of a decoded table file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTable {
    /// Schema read from the header.
    pub schema: Schema,
    /// Rows in file order.
    pub rows: Vec<Row>,
    /// Number of row lines dropped as malformed.
    pub skipped: usize,
}

/// Serializes a schema and its rows into the table file format.
pub fn encode_table(schema: &Schema, rows: &[Row]) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", schema.len());
    for column in schema.columns() {
        let _ = writeln!(out, "{} {}", column.name, column.data_type);
    }

    for (i, row) in rows.iter().enumerate() {
        let _ = write!(out, "{}", i + 1);
        for value in row.iter() {
            let _ = write!(out, "{}{}", FIELD_SEPARATOR, value);
        }
        out.push('\n');
    }

    out
}

/// Parses the contents of a table file.
///
/// `path` is only used for error messages and log output.
pub fn decode_table(path: &Path, contents: &str) -> StorageResult<DecodedTable> {
    let mut lines = contents.lines().map(|l| l.trim_end_matches('\r'));

    let header = lines
        .by_ref()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| StorageError::corrupted(path, "missing column count"))?;
    let column_count: usize = header
        .trim()
        .parse()
        .map_err(|_| StorageError::corrupted(path, format!("bad column count '{}'", header)))?;

    let mut columns = Vec::with_capacity(column_count);
    for i in 0..column_count {
        let line = lines.next().ok_or_else(|| {
            StorageError::corrupted(path, format!("missing definition for column {}", i + 1))
        })?;
        columns.push(decode_column(path, line)?);
    }

    let schema = Schema::new(columns).map_err(|e| StorageError::corrupted(path, e.to_string()))?;

    let mut rows = Vec::new();
    let mut skipped = 0;
    for (offset, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match decode_row(&schema, line) {
            Some(row) => rows.push(row),
            None => {
                skipped += 1;
                warn!(
                    path = %path.display(),
                    line = column_count + 2 + offset,
                    "dropping malformed row"
                );
            }
        }
    }

    Ok(DecodedTable {
        schema,
        rows,
        skipped,
    })
}

fn decode_column(path: &Path, line: &str) -> StorageResult<Column> {
    let mut parts = line.split_whitespace();
    let (Some(name), Some(type_name)) = (parts.next(), parts.next()) else {
        return Err(StorageError::corrupted(
            path,
            format!("bad column definition '{}'", line),
        ));
    };
    let data_type: DataType = type_name
        .parse()
        .map_err(|e: String| StorageError::corrupted(path, e))?;
    Ok(Column::new(name, data_type))
}

/// Decodes one row line, skipping the leading row number.
fn decode_row(schema: &Schema, line: &str) -> Option<Row> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() < 1 + schema.len() {
        return None;
    }

    schema
        .columns()
        .iter()
        .zip(&fields[1..])
        .map(|(column, field)| match column.data_type {
            DataType::Int => parse_integer_literal(field).map(Value::Integer),
            DataType::Text => Some(Value::Text((*field).to_string())),
        })
        .collect::<Option<Vec<_>>>()
        .map(Row::new)
}
