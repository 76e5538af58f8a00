//! Statement executor.
//!
//! This module validates statements against the catalog and runs them as
//! operator plans over a single table.
//!
//! # Architecture
//!
//! The executor consists of:
//!
//! - **Predicate**: a single `column op literal` comparison
//! - **Operator**: pull-based execution nodes (Scan, Filter, Project, Mutate)
//! - **Plan**: the operator chain built for one statement
//! - **Executor**: maps statements onto catalog calls and plans
//!
//! # Execution Model
//!
//! Operators use a pull-based iterator model:
//!
//! ```ignore
//! let mut plan = select_plan(table, predicate, indices);
//! plan.open()?;
//! while plan.next()? {
//!     let row = plan.current_row();
//!     // Process row
//! }
//! plan.close();
//! ```
//!
//! SELECT and UPDATE share the same `Scan(+Filter)` sub-plan and differ only
//! in the terminal node. DELETE collects the rows matched by that sub-plan
//! and removes them by row equality.

mod engine;
mod error;
mod evaluator;
mod operators;
mod plan;
mod result;

pub use engine::Executor;
pub use error::{ExecutionError, ExecutionResult};
pub use evaluator::{CompareOp, Predicate};
pub use operators::{Filter, Mutate, Operator, OperatorState, Project, Scan};
pub use plan::{collect_rows, scan_chain, select_plan, update_plan};
pub use result::{QueryResult, StatementResult};
