//! Descriptive statistics for numeric columns.
//!
//! Statistics follow the usual data-frame conventions: the standard
//! deviation is the sample deviation (n - 1 denominator) and quantiles use
//! linear interpolation between the two closest ranks.

use arrow::array::{Array, Float64Array};
use tracing::instrument;

use super::result::NumericSummary;

/// Largest absolute value, used to rescale inputs whose sums overflow.
pub(crate) fn max_abs(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}

/// Arithmetic mean, or `None` for an empty slice.
///
/// Values near `f64::MAX` are averaged after scaling down, so the result is
/// finite whenever every input is.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        return Some(sum / n);
    }

    let scale = max_abs(values.iter().copied());
    let scaled: f64 = values.iter().map(|v| v / scale).sum();
    Some(scaled / n * scale)
}

/// Sample standard deviation, or `None` with fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let denominator = (values.len() - 1) as f64;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    if sum_sq.is_finite() {
        return Some((sum_sq / denominator).sqrt());
    }

    let scale = max_abs(values.iter().copied());
    let scaled_mean = mean / scale;
    let scaled_sq: f64 = values
        .iter()
        .map(|v| (v / scale - scaled_mean).powi(2))
        .sum();
    Some((scaled_sq / denominator).sqrt() * scale)
}

/// Quantile `q` (0..=1) of already-sorted values, linearly interpolated.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = sorted[position.floor() as usize];
    let upper = sorted[position.ceil() as usize];
    let fraction = position - position.floor();

    let span = upper - lower;
    if span.is_finite() {
        Some(lower + span * fraction)
    } else {
        Some(lower * (1.0 - fraction) + upper * fraction)
    }
}

/// Median of unsorted values.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, 0.5)
}

/// The non-missing values of a column, in row order.
pub fn present_values(column: &Float64Array) -> Vec<f64> {
    column.iter().flatten().collect()
}

/// Computes the summary of one numeric column.
///
/// A column without any non-missing value yields a summary whose
/// statistics are all `None`.
#[instrument(skip(column), fields(analyzer = "descriptive"))]
pub fn describe_column(name: &str, column: &Float64Array) -> NumericSummary {
    let mut values = present_values(column);
    let std = sample_std_dev(&values);
    let mean = mean(&values);
    values.sort_by(f64::total_cmp);

    NumericSummary {
        column: name.to_string(),
        count: values.len(),
        missing: column.null_count(),
        mean,
        std,
        min: values.first().copied(),
        q25: quantile_sorted(&values, 0.25),
        median: quantile_sorted(&values, 0.5),
        q75: quantile_sorted(&values, 0.75),
        max: values.last().copied(),
    }
}
