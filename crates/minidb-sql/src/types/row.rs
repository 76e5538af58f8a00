//! Row representation.

use std::fmt;

use super::Value;

/// A single row of values, ordered by schema position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row with the given values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Returns the number of columns in this row.
    pub fn num_columns(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at the given index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Sets the value at the given index.
    ///
    /// An out-of-range index is a caller bug: it trips a debug assertion and
    /// is ignored in release builds.
    pub fn set(&mut self, index: usize, value: Value) {
        debug_assert!(
            index < self.values.len(),
            "column index {} out of range for {} values",
            index,
            self.values.len()
        );
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    /// Returns an iterator over the values.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Returns the values as a slice.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the row and returns the values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Builds a new row from the given column positions, in the given order.
    ///
    /// Positions may repeat. Positions past the end of the row are skipped.
    pub fn project(&self, indices: &[usize]) -> Row {
        let values = indices
            .iter()
            .filter_map(|&i| self.values.get(i).cloned())
            .collect();
        Row { values }
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl IntoIterator for Row {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str("\t")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::new(vec![Value::text("Ali"), Value::integer(18), Value::text("x")])
    }

    #[test]
    fn test_row_get_set() {
        let mut row = sample();
        assert_eq!(row.num_columns(), 3);
        assert_eq!(row.get(1), Some(&Value::integer(18)));
        assert_eq!(row.get(3), None);

        row.set(1, Value::integer(30));
        assert_eq!(row.get(1), Some(&Value::integer(30)));
        assert_eq!(row.num_columns(), 3);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of range")]
    fn test_row_set_out_of_range_asserts() {
        let mut row = sample();
        row.set(10, Value::integer(1));
    }

    #[test]
    fn test_row_project_reorders_and_repeats() {
        let row = sample();
        let projected = row.project(&[1, 0, 1]);
        assert_eq!(
            projected.values(),
            &[Value::integer(18), Value::text("Ali"), Value::integer(18)]
        );
    }

    #[test]
    fn test_row_display_is_tab_separated() {
        assert_eq!(sample().to_string(), "Ali\t18\tx");
    }
}
