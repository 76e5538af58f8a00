//! Table storage and catalog.
//!
//! This module owns the on-disk representation of tables:
//!
//! - Table catalog with lazy, load-once materialization
//! - In-memory tables persisted by whole-file rewrite
//! - The textual table file format
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Executor                             │
//! │         (validates commands, drives operator plans)         │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Storage Layer                           │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐          │
//! │  │   Catalog   │  │    Table    │  │   Encoder   │          │
//! │  │ (registry)  │  │ (rows+save) │  │ (text file) │          │
//! │  └─────────────┘  └─────────────┘  └─────────────┘          │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//!                   <data_dir>/<table>.txt
//! ```

mod catalog;
mod encoder;
mod error;
mod table;

pub use catalog::{Catalog, TABLE_FILE_EXTENSION};
pub use encoder::{decode_table, encode_table, DecodedTable};
pub use error::{StorageError, StorageResult};
pub use table::Table;
