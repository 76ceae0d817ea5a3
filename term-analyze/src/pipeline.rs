//! One end-to-end run: load, validate, preprocess, analyze, report, write.
//!
//! ```rust,no_run
//! use term_analyze::pipeline::{Pipeline, PipelineConfig};
//! use term_analyze::preprocess::{FillMethod, PreprocessConfig};
//!
//! # fn example() -> term_analyze::prelude::Result<()> {
//! let config = PipelineConfig::new("data/example.csv", "output/results")
//!     .with_required_columns(["id", "age"])
//!     .with_preprocess(PreprocessConfig::fill(FillMethod::Median).with_dedupe(true));
//!
//! let report = Pipeline::new(config).run()?;
//! println!("{}", report.summary_text);
//! for failure in &report.write_failures {
//!     eprintln!("{failure}");
//! }
//! # Ok(())
//! # }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::analyzers::{AnalysisConfig, AnalysisResult, AnalysisRunner};
use crate::formatters::{ReportMetadata, SummaryFormatter, TextReportFormatter};
use crate::prelude::*;
use crate::preprocess::{PreprocessConfig, Preprocessor};
use crate::sources::{CsvOptions, CsvSource, DataSource};
use crate::validation::RequiredColumns;
use crate::writers::{ArtifactKind, OutputPaths, ResultWriter, WrittenArtifact};

/// Input file used when none is configured.
pub const DEFAULT_INPUT: &str = "data/example.csv";
/// Output prefix used when none is configured.
pub const DEFAULT_OUTPUT_PREFIX: &str = "output/results";

/// Everything a run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub csv: CsvOptions,
    /// Artifacts are written to `<prefix>.csv`, `<prefix>.xlsx`, ...
    pub output_prefix: PathBuf,
    pub required_columns: RequiredColumns,
    pub preprocess: PreprocessConfig,
    pub analysis: AnalysisConfig,
    /// Artifacts to write, in any order
    pub artifacts: Vec<ArtifactKind>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT, DEFAULT_OUTPUT_PREFIX)
    }
}

impl PipelineConfig {
    /// Default options for the given input file and output prefix.
    pub fn new(input: impl Into<PathBuf>, output_prefix: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            csv: CsvOptions::default(),
            output_prefix: output_prefix.into(),
            required_columns: RequiredColumns::default(),
            preprocess: PreprocessConfig::default(),
            analysis: AnalysisConfig::default(),
            artifacts: ArtifactKind::ALL.to_vec(),
        }
    }

    /// Loads a configuration from a JSON file. Missing keys take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => TermError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => TermError::Io(e),
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn with_csv_options(mut self, csv: CsvOptions) -> Self {
        self.csv = csv;
        self
    }

    pub fn with_required_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_columns = RequiredColumns::new(names);
        self
    }

    pub fn with_preprocess(mut self, preprocess: PreprocessConfig) -> Self {
        self.preprocess = preprocess;
        self
    }

    pub fn with_analysis(mut self, analysis: AnalysisConfig) -> Self {
        self.analysis = analysis;
        self
    }

    /// Restricts the run to the listed artifacts.
    pub fn with_artifacts(mut self, artifacts: &[ArtifactKind]) -> Self {
        self.artifacts = artifacts.to_vec();
        self
    }

    /// Destinations derived from the prefix and artifact selection.
    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths::from_prefix(&self.output_prefix).only(&self.artifacts)
    }
}

/// Outcome of a run that got past loading and validation.
#[derive(Debug)]
pub struct RunReport {
    /// `(rows, columns)` as loaded
    pub input_shape: (usize, usize),
    /// `(rows, columns)` after preprocessing
    pub output_shape: (usize, usize),
    pub analysis: AnalysisResult,
    /// Console summary of the analysis
    pub summary_text: String,
    pub written: Vec<WrittenArtifact>,
    /// One [`TermError::Write`] per artifact that could not be written
    pub write_failures: Vec<TermError>,
    /// Per-column preprocessing issues
    pub warnings: Vec<TermError>,
}

impl RunReport {
    /// True when every selected artifact was written.
    pub fn is_complete(&self) -> bool {
        self.write_failures.is_empty()
    }

    /// Process exit code for this run: 0 when complete, otherwise the code
    /// of the first write failure.
    pub fn exit_code(&self) -> u8 {
        let first = self.write_failures.first();
        first.map_or(0, TermError::exit_code)
    }
}

/// Runs the stages in order, once.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    formatter: FormatterConfig,
    log: LogConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            formatter: FormatterConfig::default(),
            log: LogConfig::default(),
        }
    }

    /// Sets how much each stage logs.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Sets how the console summary and report are formatted.
    pub fn with_formatter_config(mut self, formatter: FormatterConfig) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Executes the run.
    ///
    /// Loading and validation failures are returned as `Err`. Every selected
    /// artifact is attempted; write failures come back in
    /// [`RunReport::write_failures`].
    #[instrument(skip(self), fields(input = %self.config.input.display()))]
    pub fn run(&self) -> Result<RunReport> {
        let config = &self.config;

        let table = CsvSource::with_options(&config.input, config.csv.clone()).load()?;
        let input_shape = table.shape();

        config.required_columns.validate(&table)?;

        let preprocessed = Preprocessor::new(config.preprocess.clone())
            .with_log_config(self.log.clone())
            .run(&table)?;
        let warnings = preprocessed.warnings();
        let output_shape = preprocessed.table.shape();

        let analysis = AnalysisRunner::with_config(config.analysis.clone())
            .with_preprocess_summary(preprocessed.summary)
            .run(&preprocessed.table)?;

        let metadata = ReportMetadata::now(&analysis);
        let summary_text =
            SummaryFormatter::with_config(self.formatter.clone()).format(&analysis, &metadata)?;

        let report_formatter =
            TextReportFormatter::with_config(self.formatter.clone().with_colors(false));
        let writer = ResultWriter::new(config.output_paths())
            .with_report_formatter(report_formatter)
            .with_log_config(self.log.clone());
        let outcome = writer.write(&analysis, &metadata);

        if outcome.is_complete() {
            info!(artifacts = outcome.written.len(), "Run complete");
        } else {
            warn!(
                written = outcome.written.len(),
                failed = outcome.failures.len(),
                "Run complete with write failures"
            );
        }

        Ok(RunReport {
            input_shape,
            output_shape,
            analysis,
            summary_text,
            written: outcome.written,
            write_failures: outcome.failures,
            warnings,
        })
    }
}
