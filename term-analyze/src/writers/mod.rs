//! Persisting analysis results.
//!
//! A run produces up to four artifacts next to an output prefix `P`:
//!
//! | Artifact         | File           | Contents                          |
//! |------------------|----------------|-----------------------------------|
//! | `StatisticsCsv`  | `P.csv`        | describe-style statistics table   |
//! | `StatisticsXlsx` | `P.xlsx`       | the same table as a spreadsheet   |
//! | `Json`           | `P.json`       | the full [`AnalysisResult`]       |
//! | `Report`         | `P_report.txt` | the text report                   |
//!
//! Every selected artifact is attempted. A failure is recorded as a
//! [`TermError::Write`] and the writer moves on, so the caller sees all
//! failures at once in [`WriteOutcome::failures`].
//!
//! Parent directories are never created.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::analyzers::{AnalysisResult, NumericSummary};
use crate::formatters::{ReportMetadata, TextReportFormatter};
use crate::prelude::*;

mod csv;
mod xlsx;

pub use self::csv::write_statistics_csv;
pub use self::xlsx::write_statistics_xlsx;

/// Header of the first column of the statistics table.
pub const STATISTIC_COLUMN: &str = "statistic";

/// Row labels of the statistics table, top to bottom.
pub const STATISTIC_ROWS: [&str; 9] = [
    "count", "missing", "mean", "std", "min", "25%", "50%", "75%", "max",
];

/// The artifacts a run can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    StatisticsCsv,
    StatisticsXlsx,
    Json,
    Report,
}

impl ArtifactKind {
    /// Every artifact, in the order they are written.
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::StatisticsCsv,
        ArtifactKind::StatisticsXlsx,
        ArtifactKind::Json,
        ArtifactKind::Report,
    ];

    /// Suffix appended to the output prefix.
    pub fn suffix(&self) -> &'static str {
        match self {
            ArtifactKind::StatisticsCsv => ".csv",
            ArtifactKind::StatisticsXlsx => ".xlsx",
            ArtifactKind::Json => ".json",
            ArtifactKind::Report => "_report.txt",
        }
    }

    /// Short label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::StatisticsCsv => "CSV",
            ArtifactKind::StatisticsXlsx => "XLSX",
            ArtifactKind::Json => "JSON",
            ArtifactKind::Report => "REPORT",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Destination of every selected artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPaths {
    paths: BTreeMap<ArtifactKind, PathBuf>,
}

impl OutputPaths {
    /// All four artifacts named after `prefix`.
    ///
    /// ```rust
    /// use term_analyze::writers::{ArtifactKind, OutputPaths};
    ///
    /// let paths = OutputPaths::from_prefix("out/results");
    /// assert_eq!(
    ///     paths.get(ArtifactKind::Report).unwrap().to_str(),
    ///     Some("out/results_report.txt")
    /// );
    /// ```
    pub fn from_prefix(prefix: impl AsRef<Path>) -> Self {
        let prefix = prefix.as_ref().as_os_str();
        let paths = ArtifactKind::ALL
            .into_iter()
            .map(|kind| {
                let mut name = prefix.to_os_string();
                name.push(kind.suffix());
                (kind, PathBuf::from(name))
            })
            .collect();
        Self { paths }
    }

    /// Overrides (or adds) the destination of one artifact.
    pub fn with_path(mut self, kind: ArtifactKind, path: impl Into<PathBuf>) -> Self {
        self.paths.insert(kind, path.into());
        self
    }

    /// Keeps only the listed artifacts.
    pub fn only(mut self, kinds: &[ArtifactKind]) -> Self {
        self.paths.retain(|kind, _| kinds.contains(kind));
        self
    }

    /// Drops one artifact.
    pub fn without(mut self, kind: ArtifactKind) -> Self {
        self.paths.remove(&kind);
        self
    }

    /// Destination of `kind`, if selected.
    pub fn get(&self, kind: ArtifactKind) -> Option<&Path> {
        self.paths.get(&kind).map(PathBuf::as_path)
    }

    /// Selected artifacts in write order.
    pub fn iter(&self) -> impl Iterator<Item = (ArtifactKind, &Path)> {
        let paths = self.paths.iter();
        paths.map(|(kind, path)| (*kind, path.as_path()))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// An artifact that was written successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrittenArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub bytes: u64,
}

/// What a [`ResultWriter`] managed to write.
#[derive(Debug, Default)]
pub struct WriteOutcome {
    pub written: Vec<WrittenArtifact>,
    /// One [`TermError::Write`] per failed artifact
    pub failures: Vec<TermError>,
}

impl WriteOutcome {
    /// True when every attempted artifact was written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Path of a written artifact.
    pub fn path_of(&self, kind: ArtifactKind) -> Option<&Path> {
        self.written
            .iter()
            .find(|a| a.kind == kind)
            .map(|a| a.path.as_path())
    }

    /// The written artifacts, or the first failure.
    pub fn into_result(mut self) -> Result<Vec<WrittenArtifact>> {
        if self.failures.is_empty() {
            Ok(self.written)
        } else {
            Err(self.failures.remove(0))
        }
    }
}

/// Writes an [`AnalysisResult`] to the selected artifacts.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    paths: OutputPaths,
    report: TextReportFormatter,
    log: LogConfig,
}

impl ResultWriter {
    /// Creates a writer for the given destinations.
    pub fn new(paths: OutputPaths) -> Self {
        Self {
            paths,
            report: TextReportFormatter::new(),
            log: LogConfig::default(),
        }
    }

    /// Sets the logging configuration.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// Uses a custom report formatter.
    pub fn with_report_formatter(mut self, report: TextReportFormatter) -> Self {
        self.report = report;
        self
    }

    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }

    /// Attempts every selected artifact and collects the failures.
    #[instrument(skip_all, fields(artifacts = self.paths.len()))]
    pub fn write(&self, result: &AnalysisResult, metadata: &ReportMetadata) -> WriteOutcome {
        let mut outcome = WriteOutcome::default();

        for (kind, path) in self.paths.iter() {
            match self.write_one(kind, path, result, metadata) {
                Ok(()) => {
                    let bytes = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
                    crate::log_data_op!(
                        self.log,
                        artifact = %kind,
                        path = %path.display(),
                        bytes,
                        "Artifact written"
                    );
                    outcome.written.push(WrittenArtifact {
                        kind,
                        path: path.to_path_buf(),
                        bytes,
                    });
                }
                Err(e) => {
                    warn!(
                        artifact = %kind,
                        path = %path.display(),
                        error = %e,
                        "Artifact not written"
                    );
                    outcome.failures.push(e);
                }
            }
        }

        outcome
    }

    fn write_one(
        &self,
        kind: ArtifactKind,
        path: &Path,
        result: &AnalysisResult,
        metadata: &ReportMetadata,
    ) -> Result<()> {
        match kind {
            ArtifactKind::StatisticsCsv => write_statistics_csv(result, path),
            ArtifactKind::StatisticsXlsx => write_statistics_xlsx(result, path),
            ArtifactKind::Json => write_json(result, path),
            ArtifactKind::Report => write_report(&self.report, result, metadata, path),
        }
    }
}

/// Writes the full result as pretty JSON.
pub fn write_json(result: &AnalysisResult, path: &Path) -> Result<()> {
    let json = result.to_json(true)?;
    fs::write(path, json).map_err(|e| TermError::write(ArtifactKind::Json, path, e))
}

/// Writes the text report.
pub fn write_report(
    formatter: &TextReportFormatter,
    result: &AnalysisResult,
    metadata: &ReportMetadata,
    path: &Path,
) -> Result<()> {
    let text = formatter.format(result, metadata)?;
    fs::write(path, text).map_err(|e| TermError::write(ArtifactKind::Report, path, e))
}

/// Builds the describe-style statistics table.
///
/// The first column holds the [`STATISTIC_ROWS`] labels; each numeric
/// column contributes one `Float64` column. Undefined statistics are null.
pub fn statistics_batch(result: &AnalysisResult) -> Result<RecordBatch> {
    let mut fields = vec![Field::new(STATISTIC_COLUMN, DataType::Utf8, false)];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(STATISTIC_ROWS.to_vec()))];

    for summary in &result.numeric {
        fields.push(Field::new(&summary.column, DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(statistic_values(summary).to_vec())));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// One column of the statistics table, in [`STATISTIC_ROWS`] order.
pub fn statistic_values(summary: &NumericSummary) -> [Option<f64>; 9] {
    [
        Some(summary.count as f64),
        Some(summary.missing as f64),
        summary.mean,
        summary.std,
        summary.min,
        summary.q25,
        summary.median,
        summary.q75,
        summary.max,
    ]
}
