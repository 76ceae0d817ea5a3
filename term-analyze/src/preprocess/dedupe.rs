//! Exact duplicate row detection using Arrow's row format.

use std::collections::HashSet;

use arrow::array::BooleanArray;
use arrow::row::{RowConverter, SortField};
use tracing::debug;

use crate::prelude::*;

/// `true` for every row that repeats an earlier row across all columns.
///
/// Missing cells compare equal to each other, so two rows with a gap in the
/// same place and equal values elsewhere are duplicates.
pub fn duplicate_flags(table: &Table) -> Result<Vec<bool>> {
    if table.num_columns() == 0 {
        return Ok(vec![false; table.num_rows()]);
    }

    let fields = table
        .schema()
        .fields()
        .iter()
        .map(|f| SortField::new(f.data_type().clone()))
        .collect();
    let converter = RowConverter::new(fields)?;
    let rows = converter.convert_columns(table.record_batch().columns())?;

    let mut seen = HashSet::with_capacity(rows.num_rows());
    Ok(rows.iter().map(|row| !seen.insert(row)).collect())
}

/// Removes duplicate rows, keeping the first occurrence.
///
/// Returns the new table and the number of rows removed.
pub fn drop_duplicate_rows(table: &Table) -> Result<(Table, usize)> {
    let keep: BooleanArray = duplicate_flags(table)?
        .into_iter()
        .map(|duplicate| Some(!duplicate))
        .collect();
    let removed = table.num_rows() - keep.true_count();
    let deduped = table.filter_rows(&keep)?;
    debug!(removed, "Removed duplicate rows");
    Ok((deduped, removed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_first_occurrence() {
        let table = Table::builder()
            .numeric("n", vec![Some(1.0), Some(2.0), Some(1.0)])
            .categorical("s", vec![Some("a"), Some("b"), Some("a")])
            .build()
            .unwrap();

        let (deduped, removed) = drop_duplicate_rows(&table).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(deduped.num_rows(), 2);
        let numbers = deduped.numeric(0).unwrap();
        assert_eq!(numbers.values().to_vec(), vec![1.0, 2.0]);
        assert_eq!(deduped.categorical(1).unwrap().value(1), "b");
    }

    #[test]
    fn test_partial_matches_are_not_duplicates() {
        let table = Table::builder()
            .numeric("n", vec![Some(1.0), Some(1.0)])
            .categorical("s", vec![Some("a"), Some("b")])
            .build()
            .unwrap();
        assert_eq!(duplicate_flags(&table).unwrap(), vec![false, false]);
    }

    #[test]
    fn test_missing_cells_compare_equal() {
        let table = Table::builder()
            .numeric("n", vec![None, None, Some(0.0)])
            .categorical("s", vec![Some("a"), Some("a"), Some("a")])
            .build()
            .unwrap();
        assert_eq!(duplicate_flags(&table).unwrap(), vec![false, true, false]);
    }
}
