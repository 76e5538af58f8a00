//! Operator execution implementations.
//!
//! This module implements executable operators that walk the rows of one
//! table in a pull-based iterator model. Each operator moves through the
//! states `Unopened -> Open -> Exhausted -> Closed`; `open()` may be called
//! again at any time to restart from the first row of the table.

use std::fmt;

use crate::storage::Table;
use crate::types::{Row, Value};

use super::error::{ExecutionError, ExecutionResult};
use super::evaluator::Predicate;

/// Lifecycle state of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorState {
    /// Constructed, `open()` not called yet.
    Unopened,
    /// Producing rows.
    Open,
    /// `next()` returned false; stays false until reopened.
    Exhausted,
    /// Released by `close()`.
    Closed,
}

/// Trait for executable operators.
pub trait Operator: fmt::Debug {
    /// Returns the operator name, used in error messages.
    fn name(&self) -> &'static str;

    /// Returns the lifecycle state.
    fn state(&self) -> OperatorState;

    /// Opens (or reopens) the operator, positioning it before the first row.
    fn open(&mut self) -> ExecutionResult<()>;

    /// Advances to the next row. Returns false once the input is exhausted.
    fn next(&mut self) -> ExecutionResult<bool>;

    /// Returns the row under the cursor, if any.
    fn current_row(&self) -> Option<&Row>;

    /// Replaces the row under the cursor, propagating down to the table.
    fn update_current_row(&mut self, row: Row) -> ExecutionResult<()>;

    /// Closes the operator and its inputs.
    fn close(&mut self);
}

/// Decides whether `next()` may pull another row.
fn check_pullable(state: OperatorState, name: &'static str) -> ExecutionResult<bool> {
    match state {
        OperatorState::Open => Ok(true),
        OperatorState::Exhausted => Ok(false),
        OperatorState::Unopened | OperatorState::Closed => Err(ExecutionError::NotOpen(name)),
    }
}

// =============================================================================
// Scan
// =============================================================================

/// Sequential scan over a table in storage order.
pub struct Scan<'a> {
    table: &'a mut Table,
    cursor: Option<usize>,
    state: OperatorState,
}

impl<'a> Scan<'a> {
    /// Creates a scan over `table`.
    pub fn new(table: &'a mut Table) -> Self {
        Self {
            table,
            cursor: None,
            state: OperatorState::Unopened,
        }
    }
}

impl fmt::Debug for Scan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scan")
            .field("table", &self.table.name())
            .field("cursor", &self.cursor)
            .field("state", &self.state)
            .finish()
    }
}

impl Operator for Scan<'_> {
    fn name(&self) -> &'static str {
        "Scan"
    }

    fn state(&self) -> OperatorState {
        self.state
    }

    fn open(&mut self) -> ExecutionResult<()> {
        self.cursor = None;
        self.state = OperatorState::Open;
        Ok(())
    }

    fn next(&mut self) -> ExecutionResult<bool> {
        if !check_pullable(self.state, self.name())? {
            return Ok(false);
        }

        let next = self.cursor.map_or(0, |i| i + 1);
        if next < self.table.row_count() {
            self.cursor = Some(next);
            Ok(true)
        } else {
            self.cursor = None;
            self.state = OperatorState::Exhausted;
            Ok(false)
        }
    }

    fn current_row(&self) -> Option<&Row> {
        self.cursor.map(|i| self.table.row(i))
    }

    fn update_current_row(&mut self, row: Row) -> ExecutionResult<()> {
        let index = self.cursor.ok_or(ExecutionError::NoCurrentRow("Scan"))?;
        self.table.set_row(index, row);
        Ok(())
    }

    fn close(&mut self) {
        self.cursor = None;
        self.state = OperatorState::Closed;
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Passes through the child rows that satisfy a predicate.
#[derive(Debug)]
pub struct Filter<'a> {
    child: Box<dyn Operator + 'a>,
    predicate: Predicate,
    state: OperatorState,
}

impl<'a> Filter<'a> {
    /// Creates a filter over `child`.
    pub fn new(child: Box<dyn Operator + 'a>, predicate: Predicate) -> Self {
        Self {
            child,
            predicate,
            state: OperatorState::Unopened,
        }
    }

    /// Returns the predicate.
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }
}

impl Operator for Filter<'_> {
    fn name(&self) -> &'static str {
        "Filter"
    }

    fn state(&self) -> OperatorState {
        self.state
    }

    fn open(&mut self) -> ExecutionResult<()> {
        self.child.open()?;
        self.state = OperatorState::Open;
        Ok(())
    }

    fn next(&mut self) -> ExecutionResult<bool> {
        if !check_pullable(self.state, self.name())? {
            return Ok(false);
        }

        while self.child.next()? {
            if self
                .child
                .current_row()
                .is_some_and(|row| self.predicate.matches(row))
            {
                return Ok(true);
            }
        }

        self.state = OperatorState::Exhausted;
        Ok(false)
    }

    fn current_row(&self) -> Option<&Row> {
        match self.state {
            OperatorState::Open => self.child.current_row(),
            _ => None,
        }
    }

    fn update_current_row(&mut self, row: Row) -> ExecutionResult<()> {
        self.child.update_current_row(row)
    }

    fn close(&mut self) {
        self.child.close();
        self.state = OperatorState::Closed;
    }
}

// =============================================================================
// Project
// =============================================================================

/// Emits the requested column positions of each child row, in order.
///
/// Positions may repeat. Projection is read-only.
#[derive(Debug)]
pub struct Project<'a> {
    child: Box<dyn Operator + 'a>,
    indices: Vec<usize>,
    current: Option<Row>,
    state: OperatorState,
}

impl<'a> Project<'a> {
    /// Creates a projection over `child`.
    pub fn new(child: Box<dyn Operator + 'a>, indices: Vec<usize>) -> Self {
        Self {
            child,
            indices,
            current: None,
            state: OperatorState::Unopened,
        }
    }

    /// Returns the projected column positions.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl Operator for Project<'_> {
    fn name(&self) -> &'static str {
        "Project"
    }

    fn state(&self) -> OperatorState {
        self.state
    }

    fn open(&mut self) -> ExecutionResult<()> {
        self.child.open()?;
        self.current = None;
        self.state = OperatorState::Open;
        Ok(())
    }

    fn next(&mut self) -> ExecutionResult<bool> {
        if !check_pullable(self.state, self.name())? {
            return Ok(false);
        }

        if self.child.next()? {
            self.current = self.child.current_row().map(|row| row.project(&self.indices));
            Ok(true)
        } else {
            self.current = None;
            self.state = OperatorState::Exhausted;
            Ok(false)
        }
    }

    fn current_row(&self) -> Option<&Row> {
        self.current.as_ref()
    }

    fn update_current_row(&mut self, _row: Row) -> ExecutionResult<()> {
        Err(ExecutionError::ReadOnly("Project"))
    }

    fn close(&mut self) {
        self.child.close();
        self.current = None;
        self.state = OperatorState::Closed;
    }
}

// =============================================================================
// Mutate
// =============================================================================

/// Terminal sink that overwrites one column of every child row.
///
/// The first `next()` drains the child, writing each modified row back
/// through `update_current_row`, and returns false. The table file is not
/// rewritten here; the caller persists once [`Mutate::rows_affected`] is
/// known.
#[derive(Debug)]
pub struct Mutate<'a> {
    child: Box<dyn Operator + 'a>,
    column: usize,
    value: Value,
    affected: usize,
    state: OperatorState,
}

impl<'a> Mutate<'a> {
    /// Creates a mutation setting `column` to `value` on every child row.
    pub fn new(child: Box<dyn Operator + 'a>, column: usize, value: Value) -> Self {
        Self {
            child,
            column,
            value,
            affected: 0,
            state: OperatorState::Unopened,
        }
    }

    /// Returns the number of rows modified since the last `open()`.
    pub fn rows_affected(&self) -> usize {
        self.affected
    }
}

impl Operator for Mutate<'_> {
    fn name(&self) -> &'static str {
        "Mutate"
    }

    fn state(&self) -> OperatorState {
        self.state
    }

    fn open(&mut self) -> ExecutionResult<()> {
        self.child.open()?;
        self.affected = 0;
        self.state = OperatorState::Open;
        Ok(())
    }

    fn next(&mut self) -> ExecutionResult<bool> {
        if !check_pullable(self.state, self.name())? {
            return Ok(false);
        }

        while self.child.next()? {
            let Some(mut row) = self.child.current_row().cloned() else {
                continue;
            };
            row.set(self.column, self.value.clone());
            self.child.update_current_row(row)?;
            self.affected += 1;
        }

        self.state = OperatorState::Exhausted;
        Ok(false)
    }

    fn current_row(&self) -> Option<&Row> {
        None
    }

    fn update_current_row(&mut self, _row: Row) -> ExecutionResult<()> {
        Err(ExecutionError::ReadOnly("Mutate"))
    }

    fn close(&mut self) {
        self.child.close();
        self.state = OperatorState::Closed;
    }
}
