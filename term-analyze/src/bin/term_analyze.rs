//! Command-line front end for the analysis pipeline.
//!
//! Exit codes: 0 success, 1 unexpected error, 2 input file not found,
//! 3 unreadable or empty data, 4 missing required columns, 5 one or more
//! artifacts could not be written.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use term_analyze::analyzers::AnalysisConfig;
use term_analyze::logging::setup::{init_logging, LoggingConfig};
use term_analyze::pipeline::{
    Pipeline, PipelineConfig, RunReport, DEFAULT_INPUT, DEFAULT_OUTPUT_PREFIX,
};
use term_analyze::prelude::*;
use term_analyze::preprocess::{FillMethod, PreprocessConfig};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(
    name = "term-analyze",
    version,
    about = "Profile a CSV file and write the results"
)]
struct Args {
    /// Input CSV or TSV file
    #[arg(short, long, default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Output path prefix; artifacts are written as <prefix>.csv, .xlsx, .json, _report.txt
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PREFIX)]
    output: PathBuf,

    /// Column names that must be present
    #[arg(long, num_args = 1..)]
    required_columns: Vec<String>,

    /// Fill missing values instead of dropping incomplete rows
    #[arg(long)]
    fill_na: bool,

    /// Fill method used with --fill-na (mean, median, mode, forward, backward)
    #[arg(long, default_value = "mean")]
    fill_method: FillMethod,

    /// Remove duplicate rows
    #[arg(long)]
    dedupe: bool,

    /// Trim and collapse whitespace in text columns
    #[arg(long)]
    trim_text: bool,

    /// Skip correlation analysis
    #[arg(long)]
    no_correlations: bool,

    /// Load the run configuration from a JSON file; other flags are ignored
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level for term-analyze (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: Level,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        if let Some(path) = &self.config {
            return PipelineConfig::from_json_file(path);
        }

        let preprocess = if self.fill_na {
            PreprocessConfig::fill(self.fill_method)
        } else {
            PreprocessConfig::default()
        }
        .with_dedupe(self.dedupe)
        .with_trim_text(self.trim_text);

        let analysis = AnalysisConfig::default().with_correlations(!self.no_correlations);
        Ok(PipelineConfig::new(&self.input, &self.output)
            .with_required_columns(self.required_columns.iter().cloned())
            .with_preprocess(preprocess)
            .with_analysis(analysis))
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let logging = LoggingConfig::default()
        .with_crate_level(args.log_level)
        .with_json_format(args.json_logs);
    if let Err(e) = init_logging(logging) {
        eprintln!("warning: logging disabled: {e}");
    }

    match run(&args) {
        Ok(report) => finish(&report),
        Err(e) => {
            print_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(args: &Args) -> Result<RunReport> {
    let config = args.pipeline_config()?;
    let log = if args.log_level >= Level::DEBUG {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };

    println!("Loading data from {}...", config.input.display());
    Pipeline::new(config).with_log_config(log).run()
}

fn finish(report: &RunReport) -> ExitCode {
    println!(
        "Loaded {} rows x {} columns; {} rows x {} columns after preprocessing",
        report.input_shape.0, report.input_shape.1, report.output_shape.0, report.output_shape.1
    );
    for warning in &report.warnings {
        println!("⚠️  {}: {warning}", warning.category());
    }

    print!("{}", report.summary_text);

    if !report.written.is_empty() {
        println!("\nFiles saved:");
        for artifact in &report.written {
            println!("  {}: {}", artifact.kind, artifact.path.display());
        }
    }

    if report.write_failures.is_empty() {
        println!("\n✓ Analysis pipeline completed successfully!");
        return ExitCode::SUCCESS;
    }

    for failure in &report.write_failures {
        print_error(failure);
    }
    ExitCode::from(report.exit_code())
}

fn print_error(error: &TermError) {
    eprintln!("❌ {}: {error}", error.category());
    if let Some(hint) = error.hint() {
        eprintln!("💡 Tip: {hint}");
    }
}
