//! Pearson correlation between numeric columns.

use arrow::array::Float64Array;
use tracing::{debug, instrument};

use super::descriptive::max_abs;
use super::result::CorrelationMatrix;
use crate::table::Table;

/// Pearson correlation over the rows where both columns are present.
///
/// Returns `None` with fewer than two joint rows or when either side is
/// constant over those rows.
pub fn pearson(x: &Float64Array, y: &Float64Array) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y.iter())
        .filter_map(|(a, b)| Some((a?, b?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let mut moments = co_moments(&pairs, 1.0, 1.0);
    if !moments.is_finite() {
        // rescaling leaves the coefficient unchanged
        let scale_x = max_abs(pairs.iter().map(|(a, _)| *a));
        let scale_y = max_abs(pairs.iter().map(|(_, b)| *b));
        moments = co_moments(&pairs, scale_x, scale_y);
    }

    let CoMoments { sxx, syy, sxy } = moments;
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Centered sums of squares and cross products.
struct CoMoments {
    sxx: f64,
    syy: f64,
    sxy: f64,
}

impl CoMoments {
    fn is_finite(&self) -> bool {
        self.sxx.is_finite() && self.syy.is_finite() && self.sxy.is_finite()
    }
}

fn co_moments(pairs: &[(f64, f64)], scale_x: f64, scale_y: f64) -> CoMoments {
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a / scale_x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b / scale_y).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (a, b) in pairs {
        let dx = a / scale_x - mean_x;
        let dy = b / scale_y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    CoMoments { sxx, syy, sxy }
}

fn joint_rows(x: &Float64Array, y: &Float64Array) -> usize {
    x.iter()
        .zip(y.iter())
        .filter(|(a, b)| a.is_some() && b.is_some())
        .count()
}

/// Correlation matrix over every numeric column of `table`.
///
/// Omitted (`None`) unless there are at least two numeric columns and some
/// pair of them shares at least two non-missing rows.
#[instrument(skip(table), fields(analyzer = "correlation"))]
pub fn correlation_matrix(table: &Table) -> Option<CorrelationMatrix> {
    let numeric: Vec<(String, &Float64Array)> = table
        .numeric_columns()
        .into_iter()
        .filter_map(|i| Some((table.column_name(i), table.numeric(i)?)))
        .collect();
    if numeric.len() < 2 {
        debug!(
            columns = numeric.len(),
            "Not enough numeric columns for correlations"
        );
        return None;
    }

    let mut has_pair = false;
    for (i, (_, x)) in numeric.iter().enumerate() {
        for (_, y) in numeric.iter().skip(i + 1) {
            if joint_rows(x, y) >= 2 {
                has_pair = true;
            }
        }
    }
    if !has_pair {
        debug!("No column pair shares two non-missing rows");
        return None;
    }

    let values = numeric
        .iter()
        .map(|(_, x)| numeric.iter().map(|(_, y)| pearson(x, y)).collect())
        .collect();

    Some(CorrelationMatrix {
        columns: numeric.into_iter().map(|(name, _)| name).collect(),
        values,
    })
}
