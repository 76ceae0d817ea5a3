//! Missing-value handling: drop incomplete rows or fill gaps per column.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use tracing::debug;

use super::{ColumnWarning, FillMethod};
use crate::analyzers::categorical::most_frequent;
use crate::analyzers::descriptive::{mean, median, present_values};
use crate::logging::truncate_field;
use crate::prelude::*;

/// Result of filling a table.
#[derive(Debug)]
pub struct FillOutcome {
    pub table: Table,
    pub cells_filled: usize,
    pub warnings: Vec<ColumnWarning>,
}

/// Removes every row that has a missing cell in any column.
///
/// Returns the new table and the number of rows removed.
pub fn drop_incomplete_rows(table: &Table) -> Result<(Table, usize)> {
    let mask = table.complete_rows();
    let kept = table.filter_rows(&mask)?;
    let dropped = table.num_rows() - kept.num_rows();
    debug!(dropped, "Dropped rows with missing values");
    Ok((kept, dropped))
}

/// Fills missing cells column by column.
///
/// Columns the method cannot be applied to are left unchanged and reported
/// in [`FillOutcome::warnings`].
pub fn fill_missing(table: &Table, method: FillMethod, log: &LogConfig) -> Result<FillOutcome> {
    let mut current = table.clone();
    let mut cells_filled = 0;
    let mut warnings = Vec::new();

    for index in 0..table.num_columns() {
        let column = table.column(index);
        if column.null_count() == 0 || method == FillMethod::None {
            continue;
        }
        let name = table.column_name(index);

        let filled = match (table.numeric(index), table.categorical(index)) {
            (Some(values), _) => fill_numeric(values, method),
            (None, Some(_)) if method.is_numeric_only() => {
                warnings.push(ColumnWarning::new(
                    &name,
                    format!("{method} fill needs a numeric column; left unchanged"),
                ));
                continue;
            }
            (None, Some(values)) => fill_text(values, method),
            (None, None) => continue,
        };

        let Some((array, count)) = filled else {
            warnings.push(ColumnWarning::new(
                &name,
                format!("no values to derive a {method} fill from; left unchanged"),
            ));
            continue;
        };

        crate::log_column!(
            log,
            column = %truncate_field(&name, log.max_field_length),
            method = %method,
            filled = count,
            "Filled missing values"
        );
        cells_filled += count;
        current = current.replace_column(index, array)?;
    }

    Ok(FillOutcome {
        table: current,
        cells_filled,
        warnings,
    })
}

/// Fills a numeric column. `None` when there is nothing to fill from.
fn fill_numeric(column: &Float64Array, method: FillMethod) -> Option<(ArrayRef, usize)> {
    let mut values: Vec<Option<f64>> = column.iter().collect();
    let filled = match method {
        FillMethod::Mean | FillMethod::Median | FillMethod::Mode => {
            let present = present_values(column);
            let fill = match method {
                FillMethod::Mean => mean(&present)?,
                FillMethod::Median => median(&present)?,
                _ => {
                    let normalized = present.iter().map(|v| normalize_zero(*v).to_bits());
                    f64::from_bits(most_frequent(normalized)?.0)
                }
            };
            fill_constant(&mut values, fill)
        }
        FillMethod::Forward => forward_fill(&mut values),
        FillMethod::Backward => backward_fill(&mut values),
        FillMethod::None => 0,
    };
    if filled == 0 && column.null_count() == column.len() {
        return None;
    }
    Some((Arc::new(Float64Array::from(values)) as ArrayRef, filled))
}

/// Fills a text column with mode, forward or backward fill.
fn fill_text(column: &StringArray, method: FillMethod) -> Option<(ArrayRef, usize)> {
    let mut values: Vec<Option<&str>> = column.iter().collect();
    let filled = match method {
        FillMethod::Mode => {
            let (fill, _) = most_frequent(column.iter().flatten())?;
            fill_constant(&mut values, fill)
        }
        FillMethod::Forward => forward_fill(&mut values),
        FillMethod::Backward => backward_fill(&mut values),
        FillMethod::Mean | FillMethod::Median | FillMethod::None => 0,
    };
    if filled == 0 && column.null_count() == column.len() {
        return None;
    }
    Some((Arc::new(StringArray::from(values)) as ArrayRef, filled))
}

fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

fn fill_constant<T: Copy>(values: &mut [Option<T>], fill: T) -> usize {
    let mut filled = 0;
    for slot in values.iter_mut().filter(|v| v.is_none()) {
        *slot = Some(fill);
        filled += 1;
    }
    filled
}

/// Carries the last seen value down into gaps. Leading gaps stay missing.
pub fn forward_fill<T: Copy>(values: &mut [Option<T>]) -> usize {
    let mut last = None;
    let mut filled = 0;
    for slot in values.iter_mut() {
        match *slot {
            Some(value) => last = Some(value),
            None => {
                if let Some(value) = last {
                    *slot = Some(value);
                    filled += 1;
                }
            }
        }
    }
    filled
}

/// Carries the next seen value up into gaps. Trailing gaps stay missing.
pub fn backward_fill<T: Copy>(values: &mut [Option<T>]) -> usize {
    let mut next = None;
    let mut filled = 0;
    for slot in values.iter_mut().rev() {
        match *slot {
            Some(value) => next = Some(value),
            None => {
                if let Some(value) = next {
                    *slot = Some(value);
                    filled += 1;
                }
            }
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_rows() -> Table {
        let labels = ["a", "b", "c", "d", "e"].map(Some);
        Table::builder()
            .numeric("x", vec![Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)])
            .categorical("s", labels.to_vec())
            .build()
            .unwrap()
    }

    #[test]
    fn test_drop_incomplete_rows() {
        let (table, dropped) = drop_incomplete_rows(&five_rows()).unwrap();
        assert_eq!(table.num_rows(), 4);
        assert_eq!(dropped, 1);
        assert_eq!(table.null_count(), 0);
    }

    #[test]
    fn test_mean_fill_uses_other_rows() {
        let outcome = fill_missing(&five_rows(), FillMethod::Mean, &LogConfig::default()).unwrap();
        let x = outcome.table.numeric(0).unwrap();

        assert_eq!(outcome.table.num_rows(), 5);
        assert_eq!(x.value(2), 3.0);
        assert_eq!(outcome.cells_filled, 1);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_median_and_mode_fill() {
        let values = vec![Some(1.0), Some(7.0), Some(7.0), None, Some(100.0)];
        let table = Table::builder().numeric("x", values).build().unwrap();

        let median = fill_missing(&table, FillMethod::Median, &LogConfig::default()).unwrap();
        assert_eq!(median.table.numeric(0).unwrap().value(3), 7.0);

        let mode = fill_missing(&table, FillMethod::Mode, &LogConfig::default()).unwrap();
        assert_eq!(mode.table.numeric(0).unwrap().value(3), 7.0);
    }

    #[test]
    fn test_mean_on_text_column_is_a_warning() {
        let table = Table::builder()
            .numeric("x", vec![Some(1.0), None, Some(3.0)])
            .categorical("s", vec![Some("a"), None, Some("c")])
            .build()
            .unwrap();

        let outcome = fill_missing(&table, FillMethod::Mean, &LogConfig::default()).unwrap();
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].column, "s");
        assert!(matches!(
            outcome.warnings[0].to_error(),
            TermError::InvalidConfig { .. }
        ));
        // the numeric column is still filled
        assert_eq!(outcome.table.numeric(0).unwrap().value(1), 2.0);
        assert!(outcome.table.categorical(1).unwrap().is_null(1));
    }

    #[test]
    fn test_text_mode_fill() {
        let table = Table::builder()
            .categorical("s", vec![Some("b"), None, Some("a"), Some("b"), Some("a")])
            .build()
            .unwrap();
        let outcome = fill_missing(&table, FillMethod::Mode, &LogConfig::default()).unwrap();
        assert_eq!(outcome.table.categorical(0).unwrap().value(1), "b");
    }

    #[test]
    fn test_forward_and_backward_leave_edges_missing() {
        let mut forward = vec![None, Some(1), None, Some(3), None];
        assert_eq!(forward_fill(&mut forward), 2);
        assert_eq!(forward, vec![None, Some(1), Some(1), Some(3), Some(3)]);

        let mut backward = vec![None, Some(1), None, Some(3), None];
        assert_eq!(backward_fill(&mut backward), 2);
        assert_eq!(backward, vec![Some(1), Some(1), Some(3), Some(3), None]);
    }

    #[test]
    fn test_all_missing_column_is_reported() {
        let table = Table::builder()
            .numeric("x", vec![None, None])
            .build()
            .unwrap();
        let outcome = fill_missing(&table, FillMethod::Mean, &LogConfig::default()).unwrap();
        assert_eq!(outcome.cells_filled, 0);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.table.null_count(), 2);
    }
}
