//! Rendering of query results for the shell.
//!
//! `plain` reproduces the library's own rendering. The other formats are
//! for reading wide results (`table`) or feeding other tools (`json`, `csv`).

use std::fmt;
use std::str::FromStr;

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use minidb_sql::{DataType, QueryResult, Value};
use serde_json::{Map, Value as JsonValue};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Header line plus tab-separated rows.
    Plain,
    /// Box-drawn table, integers right-aligned.
    Table,
    /// Array of one object per row.
    Json,
    /// Comma-separated values with a header line.
    Csv,
}

impl OutputFormat {
    /// Returns the format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Plain => "plain",
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" | "raw" => Ok(OutputFormat::Plain),
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!(
                "unknown format '{}' (expected plain, table, json or csv)",
                other
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Renders `result` in `format`. The output ends with a newline except for
/// the table and JSON formats.
pub fn format_result(result: &QueryResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => format!("{}\n", result),
        OutputFormat::Table => format_table(result),
        OutputFormat::Json => format_json(result),
        OutputFormat::Csv => format_csv(result),
    }
}

fn format_table(result: &QueryResult) -> String {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(result.columns.iter().map(Cell::new));

    for row in &result.rows {
        table.add_row(row.iter().zip(&result.column_types).map(|(value, ty)| {
            let cell = Cell::new(value);
            match ty {
                DataType::Int => cell.set_alignment(CellAlignment::Right),
                DataType::Text => cell,
            }
        }));
    }

    table.to_string()
}

/// Repeated column names collapse to one key per object.
fn format_json(result: &QueryResult) -> String {
    let objects: Vec<JsonValue> = result
        .rows
        .iter()
        .map(|row| {
            let fields: Map<String, JsonValue> = result
                .columns
                .iter()
                .cloned()
                .zip(row.iter().map(json_value))
                .collect();
            JsonValue::Object(fields)
        })
        .collect();

    serde_json::to_string_pretty(&objects).unwrap_or_else(|_| "[]".to_string())
}

fn json_value(value: &Value) -> JsonValue {
    match value {
        Value::Integer(i) => JsonValue::from(*i),
        Value::Text(s) => JsonValue::from(s.as_str()),
    }
}

fn format_csv(result: &QueryResult) -> String {
    let mut out = csv_line(result.columns.iter().map(String::as_str));
    for row in &result.rows {
        let cells: Vec<String> = row.iter().map(Value::to_string).collect();
        out.push_str(&csv_line(cells.iter().map(String::as_str)));
    }
    out
}

/// Joins fields into one CSV record, quoting where RFC 4180 requires it.
fn csv_line<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    let mut line = fields.map(csv_field).collect::<Vec<_>>().join(",");
    line.push('\n');
    line
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
