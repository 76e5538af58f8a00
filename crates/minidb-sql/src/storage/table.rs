//! In-memory tables bound to a backing file.
//!
//! A [`Table`] holds its schema and every row in memory. Each mutation
//! (insert, update, delete) is followed by a rewrite of the whole backing
//! file. There is no write-ahead log, no file locking and no atomic rename:
//! two processes writing the same table can lose data.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::types::{Row, Schema, Value};

use super::encoder::{decode_table, encode_table};
use super::error::{StorageError, StorageResult};

/// A named, schema-bound, persisted collection of rows.
pub struct Table {
    /// Table name (lowercase).
    name: String,
    /// Backing file.
    path: PathBuf,
    /// Table schema.
    schema: Schema,
    /// Rows in storage order.
    rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table with the given schema.
    ///
    /// Nothing is written until [`Table::save`] is called.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            schema,
            rows: Vec::new(),
        }
    }

    /// Opens a table from its backing file.
    ///
    /// A missing file yields an empty table with no columns.
    pub fn open(name: impl Into<String>, path: impl Into<PathBuf>) -> StorageResult<Self> {
        let mut table = Self::new(name, path, Schema::empty());
        table.load()?;
        Ok(table)
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the table schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the rows in storage order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the row at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= row_count()`.
    pub fn row(&self, index: usize) -> &Row {
        &self.rows[index]
    }

    /// Overwrites the row at `index` in memory. The row is not validated and
    /// the file is not rewritten.
    ///
    /// # Panics
    ///
    /// Panics if `index >= row_count()`.
    pub fn set_row(&mut self, index: usize, row: Row) {
        self.rows[index] = row;
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Appends a row and persists the table.
    ///
    /// The row must match the schema exactly. If the file cannot be written
    /// the row is removed again before the error is returned.
    pub fn insert_row(&mut self, row: Row) -> StorageResult<()> {
        self.schema.validate_row(&row)?;

        self.rows.push(row);
        if let Err(e) = self.save() {
            self.rows.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Sets `column` to `value` in every row matching `predicate`.
    ///
    /// Returns the number of rows changed. The table is persisted once if
    /// any row changed; if that fails the previous rows are put back.
    pub fn update_where<P>(&mut self, predicate: P, column: usize, value: Value) -> StorageResult<usize>
    where
        P: Fn(&Row) -> bool,
    {
        let target = self
            .schema
            .column(column)
            .ok_or(StorageError::ColumnOutOfRange {
                index: column,
                width: self.schema.len(),
            })?;
        if value.data_type() != target.data_type {
            return Err(StorageError::TypeMismatch {
                column: target.name.clone(),
                expected: target.data_type,
                value: value.to_string(),
            });
        }
        if !value.is_storable() {
            return Err(StorageError::UnsupportedText {
                column: target.name.clone(),
            });
        }

        let previous = self.rows.clone();
        let mut changed = 0;
        for row in self.rows.iter_mut().filter(|row| predicate(row)) {
            row.set(column, value.clone());
            changed += 1;
        }

        if changed > 0 {
            self.save_or_restore(previous)?;
        }
        Ok(changed)
    }

    /// Removes every row matching `predicate`, keeping the relative order of
    /// the rest.
    ///
    /// Returns the number of rows removed. The table is persisted once if
    /// any row was removed; if that fails the removed rows are put back.
    pub fn delete_where<P>(&mut self, predicate: P) -> StorageResult<usize>
    where
        P: Fn(&Row) -> bool,
    {
        let previous = self.rows.clone();
        self.rows.retain(|row| !predicate(row));
        let removed = previous.len() - self.rows.len();

        if removed > 0 {
            self.save_or_restore(previous)?;
        }
        Ok(removed)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Rewrites the backing file with the current schema and rows.
    pub fn save(&self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        }

        let contents = encode_table(&self.schema, &self.rows);
        write_file(&self.path, contents.as_bytes()).map_err(|e| StorageError::io(&self.path, e))?;

        debug!(table = %self.name, rows = self.rows.len(), "saved table");
        Ok(())
    }

    /// Saves the table, reinstating `previous` as the rows if the write fails.
    ///
    /// Keeps memory equal to the last persisted state after a failed
    /// mutation.
    pub fn save_or_restore(&mut self, previous: Vec<Row>) -> StorageResult<()> {
        if let Err(e) = self.save() {
            self.rows = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Replaces the in-memory schema and rows with the file contents.
    ///
    /// A missing file clears the rows and keeps the schema.
    pub fn load(&mut self) -> StorageResult<()> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(table = %self.name, "no backing file, table is empty");
                self.rows.clear();
                return Ok(());
            }
            Err(e) => return Err(StorageError::io(&self.path, e)),
        };

        let decoded = decode_table(&self.path, &contents)?;
        self.schema = decoded.schema;
        self.rows = decoded.rows;

        debug!(
            table = %self.name,
            rows = self.rows.len(),
            skipped = decoded.skipped,
            "loaded table"
        );
        Ok(())
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("schema", &self.schema)
            .field("rows", &self.rows.len())
            .finish()
    }
}

fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(contents)?;
    writer.flush()
}
