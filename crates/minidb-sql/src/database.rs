//! Database facade.
//!
//! [`Database`] ties the parser, executor and catalog together behind a
//! text-in, result-out API. Each instance owns its catalog; there is no
//! process-wide state.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::executor::{ExecutionError, Executor, StatementResult};
use crate::parser::{ParseError, Parser, Statement};
use crate::storage::{Catalog, StorageError};
use crate::types::Schema;

/// Errors returned by [`Database`].
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Command text could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Statement failed validation or execution.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// Storage failure outside statement execution.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// A database rooted at one storage directory.
///
/// # Example
///
/// ```no_run
/// use minidb_sql::{Database, DatabaseConfig};
///
/// let mut db = Database::open(DatabaseConfig::with_data_dir("./db")).unwrap();
/// db.execute("CREATE TABLE students (name STRING, age INT)").unwrap();
/// db.execute("INSERT INTO students VALUES (Omar, 22)").unwrap();
/// let result = db.execute("SELECT * FROM students WHERE age > 20").unwrap();
/// println!("{}", result);
/// ```
#[derive(Debug)]
pub struct Database {
    config: DatabaseConfig,
    executor: Executor,
}

impl Database {
    /// Opens the database, creating the storage directory if needed.
    pub fn open(config: DatabaseConfig) -> DatabaseResult<Self> {
        config.validate().map_err(DatabaseError::Config)?;

        let mut catalog = Catalog::open(&config.data_dir)?;
        if config.eager_load {
            let loaded = catalog.register_existing_all()?;
            debug!(dir = %config.data_dir.display(), tables = loaded, "eager load complete");
        }

        Ok(Self {
            config,
            executor: Executor::new(catalog),
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Returns the storage directory.
    pub fn data_dir(&self) -> &Path {
        self.executor.catalog().dir()
    }

    /// Returns the catalog.
    pub fn catalog(&self) -> &Catalog {
        self.executor.catalog()
    }

    /// Parses and executes one command.
    pub fn execute(&mut self, command: &str) -> DatabaseResult<StatementResult> {
        let statement = Parser::parse(command)?;
        debug!(%statement, "parsed");
        self.execute_statement(&statement)
    }

    /// Executes an already parsed statement.
    pub fn execute_statement(&mut self, statement: &Statement) -> DatabaseResult<StatementResult> {
        Ok(self.executor.execute(statement)?)
    }

    /// Returns the sorted names of every table, loading persisted ones.
    pub fn list_tables(&mut self) -> DatabaseResult<Vec<String>> {
        let catalog = self.executor.catalog_mut();
        catalog.register_existing_all()?;
        Ok(catalog.list_tables())
    }

    /// Returns the schema of a table.
    pub fn describe(&mut self, table: &str) -> DatabaseResult<Schema> {
        match self.executor.catalog_mut().get(table)? {
            Some(t) => Ok(t.schema().clone()),
            None => Err(StorageError::TableNotFound(table.trim().to_ascii_lowercase()).into()),
        }
    }
}
