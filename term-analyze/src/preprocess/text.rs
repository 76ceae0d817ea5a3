//! Whitespace cleanup for categorical columns.

use std::borrow::Cow;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::prelude::*;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"\s+").expect("Hard-coded regex pattern should be valid")
});

/// Strips both ends and collapses inner whitespace runs to one space.
pub fn normalize_whitespace(value: &str) -> Cow<'_, str> {
    let trimmed = value.trim();
    match WHITESPACE_RUN.replace_all(trimmed, " ") {
        Cow::Borrowed(_) => Cow::Borrowed(trimmed),
        Cow::Owned(collapsed) => Cow::Owned(collapsed),
    }
}

/// Normalizes whitespace in every categorical column.
///
/// Returns the new table and the number of values that changed.
pub fn clean_text_columns(table: &Table) -> Result<(Table, usize)> {
    let mut current = table.clone();
    let mut changed = 0;

    for index in table.categorical_columns() {
        let Some(column) = table.categorical(index) else {
            continue;
        };

        let mut column_changed = 0;
        let cleaned: StringArray = column
            .iter()
            .map(|value| {
                value.map(|v| {
                    let normalized = normalize_whitespace(v);
                    if normalized != v {
                        column_changed += 1;
                    }
                    normalized
                })
            })
            .collect();

        if column_changed > 0 {
            changed += column_changed;
            current = current.replace_column(index, Arc::new(cleaned) as ArrayRef)?;
        }
    }

    Ok((current, changed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  New   York \t"), "New York");
        assert_eq!(normalize_whitespace("a\n\nb"), "a b");
        assert_eq!(normalize_whitespace("clean"), "clean");
        assert_eq!(normalize_whitespace("   "), "");
        assert!(matches!(normalize_whitespace(" x"), Cow::Borrowed("x")));
    }

    #[test]
    fn test_clean_text_columns_counts_changes() {
        let table = Table::builder()
            .numeric("n", vec![Some(1.0), Some(2.0), Some(3.0)])
            .categorical("city", vec![Some(" Oslo"), None, Some("San  Jose")])
            .build()
            .unwrap();

        let (cleaned, changed) = clean_text_columns(&table).unwrap();
        let city = cleaned.categorical(1).unwrap();

        assert_eq!(changed, 2);
        assert_eq!(city.value(0), "Oslo");
        assert!(city.is_null(1));
        assert_eq!(city.value(2), "San Jose");
    }
}
