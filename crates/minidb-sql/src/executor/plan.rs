//! Plan construction.
//!
//! Every plan starts with a [`Scan`]. A [`Filter`] sits directly above it
//! when the command has a WHERE clause. SELECT wraps that chain in a
//! [`Project`] and UPDATE wraps it in a [`Mutate`]; DELETE drains the bare
//! chain.

use tracing::debug;

use crate::storage::Table;
use crate::types::{Row, Value};

use super::error::ExecutionResult;
use super::evaluator::Predicate;
use super::operators::{Filter, Mutate, Operator, Project, Scan};

/// Builds the shared `Scan(+Filter)` sub-plan.
pub fn scan_chain<'a>(table: &'a mut Table, predicate: Option<Predicate>) -> Box<dyn Operator + 'a> {
    let scan = Box::new(Scan::new(table));
    match predicate {
        Some(predicate) => {
            debug!(%predicate, "plan: Scan -> Filter");
            Box::new(Filter::new(scan, predicate))
        }
        None => {
            debug!("plan: Scan");
            scan
        }
    }
}

/// Builds a SELECT plan emitting the columns at `indices`.
pub fn select_plan<'a>(
    table: &'a mut Table,
    predicate: Option<Predicate>,
    indices: Vec<usize>,
) -> Project<'a> {
    Project::new(scan_chain(table, predicate), indices)
}

/// Builds an UPDATE plan setting `column` to `value`.
pub fn update_plan<'a>(
    table: &'a mut Table,
    predicate: Option<Predicate>,
    column: usize,
    value: Value,
) -> Mutate<'a> {
    Mutate::new(scan_chain(table, predicate), column, value)
}

/// Opens `op`, collects every row it produces and closes it.
pub fn collect_rows(op: &mut dyn Operator) -> ExecutionResult<Vec<Row>> {
    op.open()?;
    let mut rows = Vec::new();
    while op.next()? {
        if let Some(row) = op.current_row() {
            rows.push(row.clone());
        }
    }
    op.close();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::evaluator::CompareOp;
    use crate::executor::operators::OperatorState;
    use crate::types::{Column, Schema};
    use tempfile::TempDir;

    fn table(dir: &TempDir) -> Table {
        let schema = Schema::new(vec![Column::text("name"), Column::int("age")]).unwrap();
        let mut table = Table::new("t", dir.path().join("t.txt"), schema);
        for (name, age) in [("Ali", 18), ("Omar", 22), ("Sara", 25), ("Mona", 19)] {
            table
                .insert_row(Row::new(vec![Value::text(name), Value::integer(age)]))
                .unwrap();
        }
        table
    }

    #[test]
    fn test_scan_chain_shape() {
        let dir = TempDir::new().unwrap();
        let mut t = table(&dir);

        assert_eq!(scan_chain(&mut t, None).name(), "Scan");
        let filtered = scan_chain(&mut t, Some(Predicate::new(1, CompareOp::Eq, "22")));
        assert_eq!(filtered.name(), "Filter");
        assert_eq!(filtered.state(), OperatorState::Unopened);
    }

    #[test]
    fn test_select_plan() {
        let dir = TempDir::new().unwrap();
        let mut t = table(&dir);

        let mut plan = select_plan(&mut t, Some(Predicate::new(1, CompareOp::GtEq, "22")), vec![0]);
        let rows = collect_rows(&mut plan).unwrap();
        assert_eq!(
            rows,
            vec![Row::new(vec![Value::text("Omar")]), Row::new(vec![Value::text("Sara")])]
        );
    }

    #[test]
    fn test_update_plan_shares_sub_plan() {
        let dir = TempDir::new().unwrap();
        let mut t = table(&dir);

        let mut plan = update_plan(
            &mut t,
            Some(Predicate::new(0, CompareOp::Eq, "Sara")),
            1,
            Value::integer(30),
        );
        assert!(collect_rows(&mut plan).unwrap().is_empty());
        assert_eq!(plan.rows_affected(), 1);
        drop(plan);

        assert_eq!(t.row(2).get(1), Some(&Value::integer(30)));
        assert_eq!(t.row(1).get(1), Some(&Value::integer(22)));
    }
}
