//! # minidb-sql
//!
//! Table storage and statement execution for MiniDB.
//!
//! This crate implements:
//! - A typed value and schema model (INT and STRING columns)
//! - Textual table files with whole-file persistence
//! - A catalog with lazy, load-once table materialization
//! - A pull-based operator pipeline (Scan, Filter, Project, Mutate)
//! - A small command parser and a [`Database`] facade
//!
//! ```no_run
//! use minidb_sql::{Database, DatabaseConfig};
//!
//! let mut db = Database::open(DatabaseConfig::default()).unwrap();
//! let result = db.execute("SELECT name FROM students WHERE age >= 21").unwrap();
//! println!("{}", result);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Value, row and schema types
pub mod types;

/// Table files and the catalog
pub mod storage;

/// Command tokenizer and parser
pub mod parser;

/// Statement execution
pub mod executor;

mod config;
mod database;

pub use config::{DatabaseConfig, DEFAULT_DATA_DIR};
pub use database::{Database, DatabaseError, DatabaseResult};
pub use executor::{QueryResult, StatementResult};
pub use parser::{ParseError, Parser, Statement};
pub use storage::{Catalog, StorageError};
pub use types::{DataType, Row, Schema, Value};
