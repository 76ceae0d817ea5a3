//! Table-level quality metrics.

use crate::prelude::*;
use crate::preprocess::dedupe::duplicate_flags;
use crate::preprocess::PreprocessSummary;

/// Fraction of non-missing cells; `None` for a table without cells.
pub fn completeness(table: &Table) -> Option<f64> {
    let total = table.total_cells();
    if table.is_empty() || total == 0 {
        return None;
    }
    Some((total - table.null_count()) as f64 / total as f64)
}

/// Rows that exactly repeat an earlier row.
pub fn duplicate_count(table: &Table) -> Result<usize> {
    Ok(duplicate_flags(table)?.into_iter().filter(|d| *d).count())
}

/// Duplicate rows over rows considered.
///
/// Without a preprocessing summary this is `detected / rows`. With one, the
/// duplicates already removed are added back in and the denominator is the
/// row count before deduplication.
pub fn duplicate_ratio(
    detected: usize,
    rows: usize,
    preprocessing: Option<&PreprocessSummary>,
) -> Option<f64> {
    let (duplicates, considered) = match preprocessing {
        Some(summary) => (
            detected + summary.duplicates_removed,
            summary.rows_before_dedupe(),
        ),
        None => (detected, rows),
    };
    if considered == 0 {
        return None;
    }
    Some(duplicates as f64 / considered as f64)
}
