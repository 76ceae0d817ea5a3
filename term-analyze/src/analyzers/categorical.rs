//! Frequency profile for categorical columns.

use std::collections::HashMap;
use std::hash::Hash;

use arrow::array::{Array, StringArray};

use super::result::CategoricalSummary;

/// Most frequent value and its frequency.
///
/// Ties go to the value that appeared first.
pub fn most_frequent<K, I>(values: I) -> Option<(K, usize)>
where
    K: Eq + Hash,
    I: IntoIterator<Item = K>,
{
    // value -> (count, first position)
    let mut counts: HashMap<K, (usize, usize)> = HashMap::new();
    for (position, value) in values.into_iter().enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, (count, _))| (value, count))
}

/// Number of distinct non-missing values.
pub fn distinct_count(column: &StringArray) -> usize {
    let mut seen = std::collections::HashSet::new();
    column.iter().flatten().filter(|v| seen.insert(*v)).count()
}

/// Computes the frequency profile of one categorical column.
pub fn summarize_column(name: &str, column: &StringArray) -> CategoricalSummary {
    let top = most_frequent(column.iter().flatten());

    CategoricalSummary {
        column: name.to_string(),
        count: column.len() - column.null_count(),
        missing: column.null_count(),
        distinct: distinct_count(column),
        top: top.map(|(value, _)| value.to_string()),
        top_frequency: top.map(|(_, count)| count).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_frequent_prefers_first_on_tie() {
        assert_eq!(most_frequent(vec!["b", "a", "a", "b"]), Some(("b", 2)));
        assert_eq!(most_frequent(vec!["x", "y", "y"]), Some(("y", 2)));
        assert_eq!(most_frequent(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_summarize_column() {
        let column = StringArray::from(vec![
            Some("red"),
            Some("blue"),
            None,
            Some("blue"),
            Some("red"),
            Some("green"),
        ]);
        let summary = summarize_column("color", &column);

        assert_eq!(summary.count, 5);
        assert_eq!(summary.missing, 1);
        assert_eq!(summary.distinct, 3);
        assert_eq!(summary.top.as_deref(), Some("red"));
        assert_eq!(summary.top_frequency, 2);
    }

    #[test]
    fn test_summarize_all_missing() {
        let column = StringArray::from(vec![None::<&str>, None]);
        let summary = summarize_column("blank", &column);

        assert_eq!(summary.count, 0);
        assert_eq!(summary.distinct, 0);
        assert_eq!(summary.top, None);
        assert_eq!(summary.top_frequency, 0);
    }
}
