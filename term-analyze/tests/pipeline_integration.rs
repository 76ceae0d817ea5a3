//! End-to-end runs of the pipeline.

use std::path::Path;

use tempfile::TempDir;
use term_analyze::analyzers::{AnalysisConfig, AnalysisResult};
use term_analyze::pipeline::{Pipeline, PipelineConfig};
use term_analyze::prelude::*;
use term_analyze::preprocess::{FillMethod, PreprocessConfig};
use term_analyze::writers::ArtifactKind;

const SALES: &str = "\
region,product,units,price,rep
North,Widget,10,2.5,ann
South,Widget,,2.5,bob
North,Gadget,4,10.0,ann
East,Gadget,7,9.5,  cy
North,Widget,10,2.5,ann
West,Gizmo,3,NA,dee
";

fn setup() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("sales.csv"), SALES).unwrap();
    dir
}

fn config(dir: &Path) -> PipelineConfig {
    PipelineConfig::new(dir.join("sales.csv"), dir.join("results"))
}

#[test]
fn test_full_run_writes_all_artifacts() {
    let dir = setup();
    let report = Pipeline::new(config(dir.path()).with_required_columns(["units", "price"]))
        .run()
        .unwrap();

    assert_eq!(report.input_shape, (6, 5));
    assert_eq!(report.output_shape, (4, 5));
    assert!(report.is_complete());
    assert_eq!(report.written.len(), 4);
    for suffix in [".csv", ".xlsx", ".json", "_report.txt"] {
        let name = format!("results{suffix}");
        assert!(dir.path().join(&name).is_file(), "{name} missing");
    }

    let saved = AnalysisResult::read_json(dir.path().join("results.json")).unwrap();
    assert_eq!(saved.shape(), report.analysis.shape());
    assert_eq!(saved.categorical, report.analysis.categorical);
    assert_eq!(saved.preprocessing.unwrap().rows_dropped_missing, 2);
}

#[test]
fn test_fill_dedupe_and_trim() {
    let dir = setup();
    let preprocess = PreprocessConfig::fill(FillMethod::Median)
        .with_dedupe(true)
        .with_trim_text(true);
    let report = Pipeline::new(config(dir.path()).with_preprocess(preprocess))
        .run()
        .unwrap();

    assert_eq!(report.output_shape, (5, 5));
    assert!(report.warnings.is_empty());

    let summary = report.analysis.preprocessing.as_ref().unwrap();
    assert_eq!(summary.cells_filled, 2);
    assert_eq!(summary.duplicates_removed, 1);
    assert_eq!(summary.values_trimmed, 1);

    let ratio = report.analysis.duplicate_ratio.unwrap();
    assert!((ratio - 1.0 / 6.0).abs() < 1e-9);
    assert_eq!(report.analysis.completeness, Some(1.0));
}

#[test]
fn test_missing_required_columns_abort_before_writing() {
    let dir = setup();
    let required = ["region", "cost", "margin"];
    let err = Pipeline::new(config(dir.path()).with_required_columns(required))
        .run()
        .unwrap_err();

    match &err {
        TermError::MissingColumns { missing } => assert_eq!(missing, &["cost", "margin"]),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.exit_code(), 4);
    assert!(!dir.path().join("results.json").exists());
}

#[test]
fn test_missing_input_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = Pipeline::new(config(dir.path())).run().unwrap_err();
    assert!(matches!(err, TermError::FileNotFound { .. }));
    assert!(err.is_fatal());
    assert!(err.hint().is_some());
}

#[test]
fn test_write_failures_are_reported_not_returned() {
    let dir = setup();
    let output = dir.path().join("no_such_dir").join("results");
    let config = PipelineConfig::new(dir.path().join("sales.csv"), output)
        .with_artifacts(&[ArtifactKind::Json, ArtifactKind::Report]);

    let report = Pipeline::new(config).run().unwrap();

    assert!(report.written.is_empty());
    assert_eq!(report.write_failures.len(), 2);
    assert!(report.write_failures.iter().all(|e| e.exit_code() == 5));
    assert_eq!(report.exit_code(), 5);
}

#[test]
fn test_config_file_drives_run() {
    let dir = setup();
    let config_path = dir.path().join("run.json");
    let json = serde_json::json!({
        "input": dir.path().join("sales.csv"),
        "output_prefix": dir.path().join("from_config"),
        "preprocess": {"drop_missing": false},
        "analysis": {"compute_correlations": false},
        "artifacts": ["statistics_csv"]
    });
    std::fs::write(&config_path, json.to_string()).unwrap();

    let config = PipelineConfig::from_json_file(&config_path).unwrap();
    let expected = AnalysisConfig::default().with_correlations(false);
    assert_eq!(config.analysis, expected);

    let report = Pipeline::new(config).run().unwrap();
    assert_eq!(report.output_shape, (6, 5));
    assert!(report.analysis.correlations.is_none());
    assert_eq!(report.written.len(), 1);
    assert!(dir.path().join("from_config.csv").is_file());
}

#[test]
fn test_summary_text_for_console() {
    let dir = setup();
    let report = Pipeline::new(config(dir.path()))
        .with_formatter_config(FormatterConfig::minimal())
        .run()
        .unwrap();

    assert!(report.summary_text.contains("Shape: 4 rows x 5 columns"));
    assert!(report.summary_text.contains("rep:"));
    assert!(!report.summary_text.contains("\x1b["));
}
