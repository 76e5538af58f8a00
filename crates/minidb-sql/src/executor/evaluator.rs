//! WHERE predicate evaluation.
//!
//! A predicate compares one cell of a row against a literal. If both the
//! cell and the literal classify as integers they are compared as `i64`
//! with any of `=, !=, <, <=, >, >=`. Otherwise only `=` is meaningful and
//! compares the rendered cell text with the literal exactly; every other
//! operator never matches.

use std::fmt;
use std::str::FromStr;

use crate::types::{parse_integer_literal, Row, Value};

use super::error::ExecutionError;

/// Comparison operator of a WHERE clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
}

impl CompareOp {
    /// Returns the operator symbol.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
        }
    }

    fn compare_integers(&self, a: i64, b: i64) -> bool {
        match self {
            CompareOp::Eq => a == b,
            CompareOp::NotEq => a != b,
            CompareOp::Lt => a < b,
            CompareOp::LtEq => a <= b,
            CompareOp::Gt => a > b,
            CompareOp::GtEq => a >= b,
        }
    }
}

impl FromStr for CompareOp {
    type Err = ExecutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::NotEq),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::LtEq),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::GtEq),
            other => Err(ExecutionError::MalformedCommand(format!(
                "unsupported comparison operator '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single column comparison against a literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// Position of the compared column.
    column: usize,
    /// Comparison operator.
    op: CompareOp,
    /// Literal text.
    literal: String,
    /// Literal as an integer, if it classifies as one.
    literal_int: Option<i64>,
}

impl Predicate {
    /// Creates a predicate on the column at `column`.
    pub fn new(column: usize, op: CompareOp, literal: impl Into<String>) -> Self {
        let literal = literal.into();
        let literal_int = parse_integer_literal(&literal);
        Self {
            column,
            op,
            literal,
            literal_int,
        }
    }

    /// Returns the compared column position.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns the operator.
    pub fn op(&self) -> CompareOp {
        self.op
    }

    /// Returns the literal.
    pub fn literal(&self) -> &str {
        &self.literal
    }

    /// Evaluates the predicate on a row. Rows too short to hold the column
    /// never match.
    pub fn matches(&self, row: &Row) -> bool {
        match row.get(self.column) {
            Some(cell) => self.matches_value(cell),
            None => false,
        }
    }

    /// Evaluates the predicate on a single cell.
    pub fn matches_value(&self, cell: &Value) -> bool {
        if let (Some(a), Some(b)) = (cell.as_integer(), self.literal_int) {
            return self.op.compare_integers(a, b);
        }

        match self.op {
            CompareOp::Eq => match cell {
                Value::Text(s) => *s == self.literal,
                Value::Integer(i) => i.to_string() == self.literal,
            },
            _ => false,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {}", self.column, self.op, self.literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str, age: i64) -> Row {
        Row::new(vec![Value::text(name), Value::integer(age)])
    }

    #[test]
    fn test_parse_operators() {
        for op in ["=", "!=", "<", "<=", ">", ">="] {
            assert_eq!(op.parse::<CompareOp>().unwrap().as_str(), op);
        }
        assert!(matches!(
            "==".parse::<CompareOp>(),
            Err(ExecutionError::MalformedCommand(_))
        ));
        assert!("<>".parse::<CompareOp>().is_err());
        assert!("".parse::<CompareOp>().is_err());
    }

    #[test]
    fn test_integer_comparisons() {
        let row = person("Omar", 22);
        let check = |op: &str, lit: &str| Predicate::new(1, op.parse().unwrap(), lit).matches(&row);

        assert!(check("=", "22"));
        assert!(check("=", "022"));
        assert!(!check("=", "21"));
        assert!(check("!=", "21"));
        assert!(check(">", "20"));
        assert!(!check(">", "22"));
        assert!(check(">=", "22"));
        assert!(check("<", "23"));
        assert!(check("<=", "22"));
        assert!(!check("<", "-5"));
    }

    #[test]
    fn test_text_only_supports_equality() {
        let row = person("Sara", 25);
        let check = |op: &str, lit: &str| Predicate::new(0, op.parse().unwrap(), lit).matches(&row);

        assert!(check("=", "Sara"));
        assert!(!check("=", "sara"));
        assert!(!check("!=", "Ali"));
        assert!(!check("<", "Zed"));
        assert!(!check(">", "Ali"));
    }

    #[test]
    fn test_mixed_operands_fall_back_to_text() {
        let row = person("Sara", 25);
        assert!(!Predicate::new(1, CompareOp::Gt, "abc").matches(&row));
        assert!(!Predicate::new(1, CompareOp::Eq, "abc").matches(&row));
        assert!(!Predicate::new(0, CompareOp::Gt, "10").matches(&row));
    }

    #[test]
    fn test_numeric_text_cells_compare_as_integers() {
        let row = Row::new(vec![Value::text("100")]);
        assert!(Predicate::new(0, CompareOp::Gt, "99").matches(&row));
        assert!(Predicate::new(0, CompareOp::Eq, "0100").matches(&row));
    }

    #[test]
    fn test_overflowing_literal_compares_as_text() {
        let row = Row::new(vec![Value::text("99999999999999999999")]);
        assert!(Predicate::new(0, CompareOp::Eq, "99999999999999999999").matches(&row));
        assert!(!Predicate::new(0, CompareOp::Gt, "1").matches(&row));
    }

    #[test]
    fn test_missing_column_never_matches() {
        let row = person("Ali", 18);
        assert!(!Predicate::new(5, CompareOp::Eq, "Ali").matches(&row));
    }
}
