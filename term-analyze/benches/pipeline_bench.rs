//! Benchmarks for preprocessing and analysis.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use term_analyze::analyzers::{analyze, AnalysisConfig};
use term_analyze::preprocess::{preprocess, FillMethod, PreprocessConfig};
use term_analyze::table::Table;

/// Creates a table with sample data
fn create_table(rows: usize) -> Table {
    let id = (0..rows).map(|i| Some(i as f64)).collect();
    let value = (0..rows)
        .map(|i| if i % 20 == 0 { None } else { Some((i % 97) as f64 * 10.5) })
        .collect();
    let quantity = (0..rows)
        .map(|i| if i % 13 == 0 { None } else { Some((i % 100) as f64) })
        .collect();
    let category: Vec<Option<String>> = (0..rows)
        .map(|i| {
            if i % 10 == 0 {
                None
            } else {
                Some(format!("  cat_{} ", i % 5))
            }
        })
        .collect();

    Table::builder()
        .numeric("id", id)
        .numeric("value", value)
        .numeric("quantity", quantity)
        .categorical("category", category)
        .build()
        .expect("benchmark table")
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");

    for rows in [1_000, 10_000, 100_000] {
        let table = create_table(rows);
        group.bench_with_input(BenchmarkId::new("with_correlations", rows), &table, |b, t| {
            b.iter(|| analyze(black_box(t), &AnalysisConfig::default()).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("no_correlations", rows), &table, |b, t| {
            let config = AnalysisConfig::default().with_correlations(false);
            b.iter(|| analyze(black_box(t), &config).unwrap())
        });
    }

    group.finish();
}

fn bench_preprocess(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocess");
    let table = create_table(50_000);

    let configs = [
        ("drop", PreprocessConfig::default()),
        ("fill_mean", PreprocessConfig::fill(FillMethod::Mean)),
        ("fill_forward", PreprocessConfig::fill(FillMethod::Forward)),
        (
            "full",
            PreprocessConfig::fill(FillMethod::Mode)
                .with_dedupe(true)
                .with_trim_text(true),
        ),
    ];

    for (name, config) in configs {
        group.bench_function(name, |b| {
            b.iter(|| preprocess(black_box(&table), &config).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_analyze, bench_preprocess);
criterion_main!(benches);
