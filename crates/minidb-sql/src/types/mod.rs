//! Value and schema model.
//!
//! Every cell in a table is a typed [`Value`]; every table is bound to an
//! ordered [`Schema`]. There is no NULL: each column holds a value in every
//! row.
//!
//! - **DataType**: `Int` (signed 64-bit) or `Text`
//! - **Value**: a tagged cell value
//! - **Column / Schema**: ordered, case-insensitive column lookup
//! - **Row**: one ordered tuple of values

mod row;
mod schema;
mod value;

pub use row::Row;
pub use schema::{Column, Schema};
pub use value::{is_integer_literal, parse_integer_literal, DataType, Value};
