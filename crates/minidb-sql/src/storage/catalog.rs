//! Table catalog.
//!
//! The catalog is the single authority for which tables exist and owns the
//! one live [`Table`] instance per name. Tables are materialized lazily: the
//! first lookup after startup reads the backing file, every later lookup is
//! served from memory.
//!
//! The storage directory is the source of truth for existence. A file with
//! no in-memory entry is a valid table that has not been loaded yet.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::types::Schema;

use super::error::{StorageError, StorageResult};
use super::table::Table;

/// Extension of table files in the storage directory.
pub const TABLE_FILE_EXTENSION: &str = "txt";

/// Registry of tables stored in one directory.
#[derive(Debug)]
pub struct Catalog {
    /// Storage directory.
    dir: PathBuf,
    /// Loaded tables by lowercase name.
    tables: HashMap<String, Table>,
}

impl Catalog {
    /// Opens the catalog for a storage directory, creating the directory if
    /// needed. No table is loaded.
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StorageError::io(&dir, e))?;
        debug!(dir = %dir.display(), "opened catalog");

        Ok(Self {
            dir,
            tables: HashMap::new(),
        })
    }

    /// Returns the storage directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the backing file path for a table name.
    pub fn table_path(&self, name: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", table_key(name), TABLE_FILE_EXTENSION))
    }

    /// Checks whether a table exists in memory or on disk.
    ///
    /// Names that cannot be table names never exist.
    pub fn has(&self, name: &str) -> bool {
        let key = table_key(name);
        if validate_table_name(&key).is_err() {
            return false;
        }
        self.tables.contains_key(&key) || self.table_path(&key).is_file()
    }

    /// Checks whether a table is resident in memory.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.tables.contains_key(&table_key(name))
    }

    /// Returns the live table, loading it from disk on first access.
    ///
    /// Returns `Ok(None)` if the table exists neither in memory nor on disk,
    /// and [`StorageError::InvalidName`] if `name` is not a valid table name.
    pub fn get(&mut self, name: &str) -> StorageResult<Option<&mut Table>> {
        let key = table_key(name);
        validate_table_name(&key)?;

        if !self.tables.contains_key(&key) {
            let path = self.table_path(&key);
            if !path.is_file() {
                return Ok(None);
            }
            let table = Table::open(key.clone(), path)?;
            debug!(table = %key, rows = table.row_count(), "materialized table from disk");
            self.tables.insert(key.clone(), table);
        }

        Ok(self.tables.get_mut(&key))
    }

    /// Creates a table, writes its (empty) file and registers it.
    ///
    /// Fails with [`StorageError::TableAlreadyExists`] if the name is taken,
    /// leaving the existing table untouched.
    pub fn create(&mut self, name: &str, schema: Schema) -> StorageResult<&mut Table> {
        let key = table_key(name);
        validate_table_name(&key)?;

        if self.has(&key) {
            return Err(StorageError::TableAlreadyExists(key));
        }
        if schema.is_empty() {
            return Err(StorageError::EmptySchema);
        }

        let table = Table::new(key.clone(), self.table_path(&key), schema);
        table.save()?;
        info!(table = %key, schema = %table.schema(), "created table");

        Ok(self.tables.entry(key).or_insert(table))
    }

    /// Evicts a table from memory and deletes its backing file.
    ///
    /// Fails with [`StorageError::TableNotFound`] if neither existed.
    pub fn drop(&mut self, name: &str) -> StorageResult<()> {
        let key = table_key(name);
        validate_table_name(&key)?;
        let was_loaded = self.tables.remove(&key).is_some();

        let path = self.table_path(&key);
        let had_file = match fs::remove_file(&path) {
            Ok(()) => true,
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => return Err(StorageError::io(path, e)),
        };

        if !was_loaded && !had_file {
            return Err(StorageError::TableNotFound(key));
        }

        info!(table = %key, "dropped table");
        Ok(())
    }

    /// Loads one persisted table if it is not registered yet.
    ///
    /// Returns true if the table was loaded by this call.
    pub fn register_existing(&mut self, name: &str) -> StorageResult<bool> {
        let key = table_key(name);
        if validate_table_name(&key).is_err()
            || self.tables.contains_key(&key)
            || !self.table_path(&key).is_file()
        {
            return Ok(false);
        }

        let table = Table::open(key.clone(), self.table_path(&key))?;
        self.tables.insert(key, table);
        Ok(true)
    }

    /// Scans the storage directory and loads every persisted table that is
    /// not registered yet.
    ///
    /// Files that do not decode as tables are skipped with a warning. Returns
    /// the number of tables loaded by this call.
    pub fn register_existing_all(&mut self) -> StorageResult<usize> {
        fs::create_dir_all(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;

        let entries = fs::read_dir(&self.dir).map_err(|e| StorageError::io(&self.dir, e))?;
        let mut loaded = 0;

        for entry in entries {
            let path = entry.map_err(|e| StorageError::io(&self.dir, e))?.path();
            if !path.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(TABLE_FILE_EXTENSION)
            {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_table_name(&table_key(stem)).is_err() {
                debug!(path = %path.display(), "skipping file with invalid table name");
                continue;
            }
            match self.register_existing(stem) {
                Ok(true) => loaded += 1,
                Ok(false) => {}
                Err(StorageError::Corrupted { path, reason }) => {
                    warn!(path = %path.display(), %reason, "skipping unreadable table file");
                }
                Err(e) => return Err(e),
            }
        }

        if loaded > 0 {
            info!(loaded, dir = %self.dir.display(), "registered existing tables");
        }
        Ok(loaded)
    }

    /// Returns the sorted names of the registered tables.
    pub fn list_tables(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Returns the number of registered tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

/// Normalizes a table name into its catalog key.
fn table_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

/// Table names become file names, so only `[a-z0-9_]` is allowed.
fn validate_table_name(key: &str) -> StorageResult<()> {
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StorageError::InvalidName(key.to_string()));
    }
    Ok(())
}
