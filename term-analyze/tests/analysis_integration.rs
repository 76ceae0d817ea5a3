//! Integration tests for preprocessing and analysis on loaded data.

use std::sync::{Arc, Mutex};

use tempfile::NamedTempFile;
use term_analyze::analyzers::{analyze, AnalysisConfig, AnalysisRunner};
use term_analyze::prelude::*;
use term_analyze::preprocess::{preprocess, FillMethod, PreprocessConfig};
use term_analyze::sources::load_csv;

const EMPLOYEES: &str = "\
id,name,age,salary,department
1,Alice,30,50000,Sales
2,Bob,NA,60000,Engineering
3,Carol,40,,Engineering
4,Dan,35,55000,Sales
5,Eve,28,52000,  Marketing
4,Dan,35,55000,Sales
";

fn employees() -> (NamedTempFile, Table) {
    let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    std::fs::write(file.path(), EMPLOYEES).unwrap();
    let table = load_csv(file.path()).unwrap();
    (file, table)
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.unwrap();
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_raw_table_metrics() {
    let (_file, table) = employees();
    let result = analyze(&table, &AnalysisConfig::default()).unwrap();

    assert_eq!(result.shape(), (6, 5));
    assert_close(result.completeness, 28.0 / 30.0);
    assert_close(result.duplicate_ratio, 1.0 / 6.0);

    let department = result.categorical_summary("department").unwrap();
    assert_eq!(department.top.as_deref(), Some("Sales"));
    assert_eq!(department.top_frequency, 3);
    assert_eq!(department.distinct, 3);
}

#[test]
fn test_drop_dedupe_then_analyze() {
    let (_file, table) = employees();
    let config = PreprocessConfig::default()
        .with_dedupe(true)
        .with_trim_text(true);
    let cleaned = preprocess(&table, &config).unwrap();

    assert_eq!(cleaned.table.num_rows(), 3);
    assert_eq!(cleaned.summary.rows_dropped_missing, 2);
    assert_eq!(cleaned.summary.duplicates_removed, 1);
    assert_eq!(cleaned.summary.values_trimmed, 1);

    let result = AnalysisRunner::new()
        .with_preprocess_summary(cleaned.summary.clone())
        .run(&cleaned.table)
        .unwrap();

    let age = result.numeric_summary("age").unwrap();
    assert_eq!(age.count, 3);
    assert_close(age.mean, 31.0);
    assert_close(age.median, 30.0);
    assert_close(age.min, 28.0);
    assert_close(age.max, 35.0);
    assert_close(age.q25, 29.0);
    assert_close(age.q75, 32.5);

    // one duplicate out of the four rows that reached deduplication
    assert_close(result.duplicate_ratio, 0.25);
    assert_close(result.completeness, 1.0);
    assert_eq!(result.preprocessing.as_ref(), Some(&cleaned.summary));

    let department = result.categorical_summary("department").unwrap();
    assert_eq!(department.distinct, 2);
}

#[test]
fn test_mean_fill_keeps_every_row() {
    let (_file, table) = employees();
    let cleaned = preprocess(&table, &PreprocessConfig::fill(FillMethod::Mean)).unwrap();

    assert_eq!(cleaned.table.num_rows(), 6);
    assert_eq!(cleaned.table.null_count(), 0);
    assert_eq!(cleaned.summary.cells_filled, 2);
    assert!(cleaned.summary.warnings.is_empty());

    let age_index = cleaned.table.column_index("age").unwrap();
    let age = cleaned.table.numeric(age_index).unwrap();
    assert!((age.value(1) - 33.6).abs() < 1e-9);
}

#[test]
fn test_mean_fill_warns_for_text_columns() {
    let table = Table::builder()
        .numeric("x", vec![Some(1.0), None, Some(5.0)])
        .categorical("city", vec![Some("Oslo"), None, Some("Lima")])
        .build()
        .unwrap();

    let cleaned = preprocess(&table, &PreprocessConfig::fill(FillMethod::Median)).unwrap();
    let warnings = cleaned.warnings();

    assert_eq!(warnings.len(), 1);
    assert!(matches!(&warnings[0], TermError::InvalidConfig { column, .. } if column == "city"));
    assert!(!warnings[0].is_fatal());
    assert_eq!(cleaned.table.null_count(), 1);
}

#[test]
fn test_correlations() {
    let table = Table::builder()
        .numeric("x", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)])
        .numeric("double", vec![Some(2.0), Some(4.0), Some(6.0), Some(8.0)])
        .numeric("inverse", vec![Some(4.0), Some(3.0), None, Some(1.0)])
        .numeric("flat", vec![Some(7.0), Some(7.0), Some(7.0), Some(7.0)])
        .build()
        .unwrap();

    let result = analyze(&table, &AnalysisConfig::default()).unwrap();
    let matrix = result.correlations.as_ref().unwrap();

    assert_eq!(matrix.columns.len(), 4);
    assert_close(matrix.get("x", "double"), 1.0);
    assert_close(matrix.get("x", "inverse"), -1.0);
    assert_eq!(matrix.get("x", "flat"), None);
    assert_eq!(matrix.get("double", "x"), matrix.get("x", "double"));

    let without = analyze(&table, &AnalysisConfig::default().with_correlations(false)).unwrap();
    assert!(without.correlations.is_none());
}

#[test]
fn test_single_numeric_column_has_no_matrix() {
    let table = Table::builder()
        .numeric("x", vec![Some(1.0), Some(2.0)])
        .categorical("s", vec![Some("a"), Some("b")])
        .build()
        .unwrap();
    let result = analyze(&table, &AnalysisConfig::default()).unwrap();
    assert!(result.correlations.is_none());
}

#[test]
fn test_empty_table_metrics_are_undefined() {
    let table = Table::builder()
        .numeric("x", vec![])
        .categorical("s", Vec::<Option<&str>>::new())
        .build()
        .unwrap();
    let result = analyze(&table, &AnalysisConfig::default()).unwrap();

    assert_eq!(result.completeness, None);
    assert_eq!(result.duplicate_ratio, None);
    assert_eq!(result.numeric_summary("x").unwrap().mean, None);
    assert_eq!(result.categorical_summary("s").unwrap().top, None);
}

#[test]
fn test_progress_is_reported() {
    let (_file, table) = employees();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    AnalysisRunner::new()
        .on_progress(move |p| sink.lock().unwrap().push(p))
        .run(&table)
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.last(), Some(&1.0));
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
}
