//! Statement execution engine.
//!
//! The [`Executor`] owns the [`Catalog`] and maps each [`Statement`] onto
//! catalog calls and an operator plan. All validation (table existence,
//! column names, literal types) happens before any row is touched, so a
//! failed statement leaves tables and files unchanged.

use std::collections::HashSet;

use tracing::debug;

use crate::parser::{Assignment, Projection, Statement, WhereClause};
use crate::storage::{Catalog, StorageError, Table};
use crate::types::{Column, Row, Schema, Value};

use super::error::{ExecutionError, ExecutionResult};
use super::evaluator::{CompareOp, Predicate};
use super::plan::{collect_rows, scan_chain, select_plan, update_plan};
use super::result::{QueryResult, StatementResult};

/// Executes statements against an owned catalog.
#[derive(Debug)]
pub struct Executor {
    catalog: Catalog,
}

impl Executor {
    /// Creates an executor over `catalog`.
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Returns the catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the catalog mutably.
    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    /// Consumes the executor, returning the catalog.
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// Executes one statement.
    pub fn execute(&mut self, statement: &Statement) -> ExecutionResult<StatementResult> {
        debug!(kind = statement.kind(), table = statement.table(), "executing statement");

        let table = statement.table().trim();
        if table.is_empty() {
            return Err(ExecutionError::MalformedCommand(format!(
                "{} without a table name",
                statement.kind()
            )));
        }

        match statement {
            Statement::CreateTable { columns, .. } => {
                let schema = Schema::new(
                    columns
                        .iter()
                        .map(|c| Column::new(&c.name, c.data_type))
                        .collect(),
                )?;
                let name = self.catalog.create(table, schema)?.name().to_string();
                Ok(StatementResult::Created { table: name })
            }
            Statement::Insert { values, .. } => self.execute_insert(table, values),
            Statement::Select {
                projection, filter, ..
            } => self.execute_select(table, projection, filter.as_ref()),
            Statement::Update {
                assignment, filter, ..
            } => self.execute_update(table, assignment, filter.as_ref()),
            Statement::Delete { filter, .. } => self.execute_delete(table, filter.as_ref()),
            Statement::DropTable { .. } => {
                self.catalog.drop(table)?;
                Ok(StatementResult::Dropped {
                    table: table.to_ascii_lowercase(),
                })
            }
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    fn execute_insert(&mut self, name: &str, values: &[String]) -> ExecutionResult<StatementResult> {
        let table = self.table(name)?;
        let schema = table.schema();

        if values.len() != schema.len() {
            return Err(StorageError::RowShapeMismatch {
                expected: schema.len(),
                actual: values.len(),
            }
            .into());
        }

        let row = values
            .iter()
            .zip(schema.columns())
            .map(|(literal, column)| coerce(column, literal))
            .collect::<ExecutionResult<Vec<_>>>()?;

        table.insert_row(Row::new(row))?;
        Ok(StatementResult::Inserted {
            table: table.name().to_string(),
        })
    }

    fn execute_select(
        &mut self,
        name: &str,
        projection: &Projection,
        filter: Option<&WhereClause>,
    ) -> ExecutionResult<StatementResult> {
        let table = self.table(name)?;
        let schema = table.schema();

        let indices = match projection {
            Projection::All => (0..schema.len()).collect::<Vec<_>>(),
            Projection::Columns(names) if names.is_empty() => {
                return Err(ExecutionError::MalformedCommand(
                    "SELECT without a column list".into(),
                ));
            }
            Projection::Columns(names) => names
                .iter()
                .map(|n| resolve_column(schema, n))
                .collect::<ExecutionResult<Vec<_>>>()?,
        };
        let columns = indices
            .iter()
            .filter_map(|&i| schema.column(i))
            .map(|c| c.name.clone())
            .collect();
        let column_types = indices
            .iter()
            .filter_map(|&i| schema.column(i))
            .map(|c| c.data_type)
            .collect();
        let predicate = build_predicate(schema, filter)?;

        let mut plan = select_plan(table, predicate, indices);
        let rows = collect_rows(&mut plan)?;

        Ok(StatementResult::Query(QueryResult {
            columns,
            column_types,
            rows,
        }))
    }

    fn execute_update(
        &mut self,
        name: &str,
        assignment: &Assignment,
        filter: Option<&WhereClause>,
    ) -> ExecutionResult<StatementResult> {
        let table = self.table(name)?;
        let schema = table.schema();

        let column = resolve_column(schema, &assignment.column)?;
        let target = schema
            .column(column)
            .ok_or_else(|| ExecutionError::UnknownColumn(assignment.column.clone()))?;
        let value = coerce(target, &assignment.value)?;
        if !value.is_storable() {
            return Err(StorageError::UnsupportedText {
                column: target.name.clone(),
            }
            .into());
        }
        let predicate = build_predicate(schema, filter)?;

        // Mutate writes through to the table; keep the rows for a failed save.
        let previous = table.rows().to_vec();
        let mut plan = update_plan(table, predicate, column, value);
        collect_rows(&mut plan)?;
        let count = plan.rows_affected();
        drop(plan);

        if count > 0 {
            table.save_or_restore(previous)?;
        }
        Ok(StatementResult::Updated {
            table: table.name().to_string(),
            count,
        })
    }

    fn execute_delete(
        &mut self,
        name: &str,
        filter: Option<&WhereClause>,
    ) -> ExecutionResult<StatementResult> {
        let table = self.table(name)?;
        let predicate = build_predicate(table.schema(), filter)?;

        let mut chain = scan_chain(table, predicate);
        let matched: HashSet<Row> = collect_rows(chain.as_mut())?.into_iter().collect();
        drop(chain);

        let count = if matched.is_empty() {
            0
        } else {
            table.delete_where(|row| matched.contains(row))?
        };
        Ok(StatementResult::Deleted {
            table: table.name().to_string(),
            count,
        })
    }

    fn table(&mut self, name: &str) -> ExecutionResult<&mut Table> {
        self.catalog
            .get(name)?
            .ok_or_else(|| StorageError::TableNotFound(name.trim().to_ascii_lowercase()).into())
    }
}

/// Resolves a column name to its schema position.
fn resolve_column(schema: &Schema, name: &str) -> ExecutionResult<usize> {
    schema
        .index_of(name)
        .ok_or_else(|| ExecutionError::UnknownColumn(name.trim().to_ascii_lowercase()))
}

/// Converts a literal for `column`, rejecting non-integers for INT columns.
fn coerce(column: &Column, literal: &str) -> ExecutionResult<Value> {
    column
        .data_type
        .coerce(literal)
        .ok_or_else(|| ExecutionError::TypeMismatch {
            column: column.name.clone(),
            expected: column.data_type,
            value: literal.to_string(),
        })
}

/// Resolves an optional WHERE clause into a predicate.
fn build_predicate(schema: &Schema, filter: Option<&WhereClause>) -> ExecutionResult<Option<Predicate>> {
    let Some(clause) = filter else {
        return Ok(None);
    };

    if clause.column.trim().is_empty() {
        return Err(ExecutionError::MalformedCommand(
            "WHERE clause without a column".into(),
        ));
    }
    if clause.operator.trim().is_empty() {
        return Err(ExecutionError::MalformedCommand(
            "WHERE clause without an operator".into(),
        ));
    }

    let column = resolve_column(schema, &clause.column)?;
    let op: CompareOp = clause.operator.parse()?;
    Ok(Some(Predicate::new(column, op, clause.value.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ColumnSpec, Parser};
    use crate::types::DataType;
    use tempfile::TempDir;

    fn executor(dir: &TempDir) -> Executor {
        Executor::new(Catalog::open(dir.path()).unwrap())
    }

    fn run(exec: &mut Executor, command: &str) -> ExecutionResult<StatementResult> {
        exec.execute(&Parser::parse(command).unwrap())
    }

    fn seeded(dir: &TempDir) -> Executor {
        let mut exec = executor(dir);
        run(&mut exec, "CREATE TABLE students (name STRING, age INT)").unwrap();
        for (name, age) in [("Ali", 18), ("Omar", 22), ("Sara", 25), ("Mona", 19)] {
            run(
                &mut exec,
                &format!("INSERT INTO students VALUES ({}, {})", name, age),
            )
            .unwrap();
        }
        exec
    }

    fn query(exec: &mut Executor, command: &str) -> QueryResult {
        match run(exec, command).unwrap() {
            StatementResult::Query(q) => q,
            other => panic!("Expected query result, got {:?}", other),
        }
    }

    #[test]
    fn test_create_and_insert() {
        let dir = TempDir::new().unwrap();
        let mut exec = executor(&dir);

        let created = run(&mut exec, "CREATE TABLE Students (name STRING, age INT)").unwrap();
        assert_eq!(created.to_string(), "[OK] Created students");

        let inserted = run(&mut exec, "INSERT INTO students VALUES (Ali, 18)").unwrap();
        assert_eq!(inserted.to_string(), "[OK] Inserted into students");
        assert_eq!(
            std::fs::read_to_string(dir.path().join("students.txt")).unwrap(),
            "2\nname STRING\nage INT\n1,Ali,18\n"
        );
    }

    #[test]
    fn test_select_filter() {
        let dir = TempDir::new().unwrap();
        let mut exec = seeded(&dir);

        let q = query(&mut exec, "SELECT * FROM students WHERE age > 20");
        assert_eq!(q.columns, ["name", "age"]);
        assert_eq!(q.column_types, [DataType::Text, DataType::Int]);
        assert_eq!(
            q.rows,
            vec![
                Row::new(vec![Value::text("Omar"), Value::integer(22)]),
                Row::new(vec![Value::text("Sara"), Value::integer(25)]),
            ]
        );
    }

    #[test]
    fn test_select_projection_order() {
        let dir = TempDir::new().unwrap();
        let mut exec = seeded(&dir);

        let q = query(&mut exec, "SELECT age, NAME, age FROM students WHERE name = Mona");
        assert_eq!(q.columns, ["age", "name", "age"]);
        assert_eq!(
            q.rows,
            vec![Row::new(vec![
                Value::integer(19),
                Value::text("Mona"),
                Value::integer(19)
            ])]
        );
    }

    #[test]
    fn test_update_changes_one_row() {
        let dir = TempDir::new().unwrap();
        let mut exec = seeded(&dir);

        let result = run(&mut exec, "UPDATE students SET age = 30 WHERE name = Sara").unwrap();
        assert_eq!(result.rows_affected(), Some(1));
        assert_eq!(result.to_string(), "[OK] UPDATE changed: 1");

        assert_eq!(
            std::fs::read_to_string(dir.path().join("students.txt")).unwrap(),
            "2\nname STRING\nage INT\n1,Ali,18\n2,Omar,22\n3,Sara,30\n4,Mona,19\n"
        );
    }

    #[test]
    fn test_update_without_where_changes_all_rows() {
        let dir = TempDir::new().unwrap();
        let mut exec = seeded(&dir);

        let result = run(&mut exec, "UPDATE students SET name = X").unwrap();
        assert_eq!(result.rows_affected(), Some(4));
        let q = query(&mut exec, "SELECT name FROM students WHERE name = X");
        assert_eq!(q.row_count(), 4);
    }

    #[test]
    fn test_delete() {
        let dir = TempDir::new().unwrap();
        let mut exec = seeded(&dir);

        let result = run(&mut exec, "DELETE FROM students WHERE age < 20").unwrap();
        assert_eq!(result.to_string(), "[OK] DELETE removed: 2");

        let q = query(&mut exec, "SELECT name FROM students");
        assert_eq!(
            q.rows,
            vec![
                Row::new(vec![Value::text("Omar")]),
                Row::new(vec![Value::text("Sara")]),
            ]
        );
    }

    #[test]
    fn test_delete_without_match_leaves_file_alone() {
        let dir = TempDir::new().unwrap();
        let mut exec = seeded(&dir);
        let path = dir.path().join("students.txt");
        let before = std::fs::metadata(&path).unwrap().modified().unwrap();

        let result = run(&mut exec, "DELETE FROM students WHERE age < 0").unwrap();
        assert_eq!(result.rows_affected(), Some(0));
        assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), before);
    }

    #[test]
    fn test_delete_removes_duplicate_rows_together() {
        let dir = TempDir::new().unwrap();
        let mut exec = seeded(&dir);
        run(&mut exec, "INSERT INTO students VALUES (Ali, 18)").unwrap();

        let result = run(&mut exec, "DELETE FROM students WHERE name = Ali").unwrap();
        assert_eq!(result.rows_affected(), Some(2));
    }

    #[test]
    fn test_validation_errors_leave_state_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut exec = seeded(&dir);
        let path = dir.path().join("students.txt");
        let before = std::fs::read_to_string(&path).unwrap();

        assert!(matches!(
            run(&mut exec, "INSERT INTO students VALUES (Zed)"),
            Err(ExecutionError::Storage(StorageError::RowShapeMismatch {
                expected: 2,
                actual: 1
            }))
        ));
        assert!(matches!(
            run(&mut exec, "INSERT INTO students VALUES (Zed, old)"),
            Err(ExecutionError::TypeMismatch { .. })
        ));
        assert!(matches!(
            run(&mut exec, "INSERT INTO students VALUES ('a,b', 1)"),
            Err(ExecutionError::Storage(StorageError::UnsupportedText { .. }))
        ));
        assert!(matches!(
            run(&mut exec, "UPDATE students SET age = old WHERE name = Ali"),
            Err(ExecutionError::TypeMismatch { .. })
        ));
        assert!(matches!(
            run(&mut exec, "UPDATE students SET grade = 1"),
            Err(ExecutionError::UnknownColumn(c)) if c == "grade"
        ));
        assert!(matches!(
            run(&mut exec, "SELECT grade FROM students"),
            Err(ExecutionError::UnknownColumn(_))
        ));
        assert!(matches!(
            run(&mut exec, "DELETE FROM students WHERE grade = 1"),
            Err(ExecutionError::UnknownColumn(_))
        ));
        assert!(matches!(
            run(&mut exec, "DELETE FROM students WHERE age == 1"),
            Err(ExecutionError::MalformedCommand(_))
        ));

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_failed_save_leaves_rows_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut exec = seeded(&dir);
        let path = dir.path().join("students.txt");
        let before = query(&mut exec, "SELECT * FROM students").rows;

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(matches!(
            run(&mut exec, "UPDATE students SET age = 40 WHERE name = Ali"),
            Err(ExecutionError::Storage(StorageError::Io { .. }))
        ));
        assert!(matches!(
            run(&mut exec, "DELETE FROM students WHERE age > 20"),
            Err(ExecutionError::Storage(StorageError::Io { .. }))
        ));
        assert_eq!(query(&mut exec, "SELECT * FROM students").rows, before);
    }

    #[test]
    fn test_missing_table() {
        let dir = TempDir::new().unwrap();
        let mut exec = executor(&dir);

        for command in [
            "INSERT INTO ghost VALUES (1)",
            "SELECT * FROM ghost",
            "UPDATE ghost SET a = 1",
            "DELETE FROM ghost",
            "DROP TABLE ghost",
        ] {
            assert!(
                matches!(
                    run(&mut exec, command),
                    Err(ExecutionError::Storage(StorageError::TableNotFound(ref t))) if t == "ghost"
                ),
                "{}",
                command
            );
        }
    }

    #[test]
    fn test_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        let mut exec = seeded(&dir);

        assert!(matches!(
            run(&mut exec, "CREATE TABLE students (x INT)"),
            Err(ExecutionError::Storage(StorageError::TableAlreadyExists(_)))
        ));
        assert_eq!(query(&mut exec, "SELECT * FROM students").row_count(), 4);
    }

    #[test]
    fn test_create_rejects_duplicate_and_empty_columns() {
        let dir = TempDir::new().unwrap();
        let mut exec = executor(&dir);

        assert!(matches!(
            run(&mut exec, "CREATE TABLE t (a INT, A STRING)"),
            Err(ExecutionError::Storage(StorageError::DuplicateColumn(_)))
        ));
        assert!(matches!(
            run(&mut exec, "CREATE TABLE t ()"),
            Err(ExecutionError::Storage(StorageError::EmptySchema))
        ));
        assert!(!exec.catalog().has("t"));
    }

    #[test]
    fn test_malformed_descriptors() {
        let dir = TempDir::new().unwrap();
        let mut exec = seeded(&dir);

        let no_table = Statement::DropTable { table: "  ".into() };
        assert!(matches!(
            exec.execute(&no_table),
            Err(ExecutionError::MalformedCommand(_))
        ));

        let no_columns = Statement::Select {
            table: "students".into(),
            projection: Projection::Columns(vec![]),
            filter: None,
        };
        assert!(matches!(
            exec.execute(&no_columns),
            Err(ExecutionError::MalformedCommand(_))
        ));

        let no_operator = Statement::Delete {
            table: "students".into(),
            filter: Some(WhereClause::new("age", "", "1")),
        };
        assert!(matches!(
            exec.execute(&no_operator),
            Err(ExecutionError::MalformedCommand(_))
        ));

        let created = exec
            .execute(&Statement::CreateTable {
                table: "direct".into(),
                columns: vec![ColumnSpec::new("id", DataType::Int)],
            })
            .unwrap();
        assert_eq!(created.to_string(), "[OK] Created direct");
    }

    #[test]
    fn test_drop() {
        let dir = TempDir::new().unwrap();
        let mut exec = seeded(&dir);

        let result = run(&mut exec, "DROP TABLE students").unwrap();
        assert_eq!(result.to_string(), "Table 'students' dropped successfully.");
        assert!(!dir.path().join("students.txt").exists());
        assert!(!exec.catalog().has("students"));
    }
}
