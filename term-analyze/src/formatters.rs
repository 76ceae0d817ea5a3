//! Rendering of analysis results as text and JSON.
//!
//! # Examples
//!
//! ```rust
//! use term_analyze::analyzers::{analyze, AnalysisConfig};
//! use term_analyze::formatters::{ReportMetadata, ResultFormatter, TextReportFormatter};
//! use term_analyze::table::Table;
//!
//! let table = Table::builder()
//!     .numeric("age", vec![Some(30.0), Some(40.0)])
//!     .build()
//!     .unwrap();
//! let result = analyze(&table, &AnalysisConfig::default()).unwrap();
//!
//! let report = TextReportFormatter::new()
//!     .format(&result, &ReportMetadata::now(&result))
//!     .unwrap();
//! assert!(report.contains("Data shape: 2 rows x 1 columns"));
//! ```

use std::fmt::Write;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::analyzers::AnalysisResult;
use crate::prelude::*;

/// Timestamp format used in reports.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Context printed alongside the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Local>,
    /// `(rows, columns)`
    pub shape: (usize, usize),
}

impl ReportMetadata {
    /// Metadata stamped with the current time and the result's shape.
    pub fn now(result: &AnalysisResult) -> Self {
        Self::at(Local::now(), result.shape())
    }

    /// Metadata with an explicit timestamp.
    pub fn at(generated_at: DateTime<Local>, shape: (usize, usize)) -> Self {
        Self {
            generated_at,
            shape,
        }
    }
}

/// Configuration options for formatting results.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Digits after the decimal point for statistics
    pub float_precision: usize,
    /// Maximum number of columns listed per section (0 for all)
    pub max_columns: usize,
    /// Whether to use ANSI colors (console summary only)
    pub use_colors: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            float_precision: 4,
            max_columns: 0,
            use_colors: false,
        }
    }
}

impl FormatterConfig {
    /// Short output without colors.
    pub fn minimal() -> Self {
        Self {
            float_precision: 2,
            max_columns: 10,
            use_colors: false,
        }
    }

    /// Everything, with colors.
    pub fn detailed() -> Self {
        Self {
            float_precision: 4,
            max_columns: 0,
            use_colors: true,
        }
    }

    /// Sets the float precision.
    pub fn with_precision(mut self, digits: usize) -> Self {
        self.float_precision = digits;
        self
    }

    /// Sets the per-section column limit.
    pub fn with_max_columns(mut self, max: usize) -> Self {
        self.max_columns = max;
        self
    }

    /// Sets whether to use colorized output.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    fn number(&self, value: Option<f64>) -> String {
        match value {
            Some(v) => format!("{v:.prec$}", prec = self.float_precision),
            None => "n/a".to_string(),
        }
    }

    fn percent(&self, value: Option<f64>) -> String {
        match value {
            Some(v) => format!("{:.2}%", v * 100.0),
            None => "n/a".to_string(),
        }
    }

    fn limit(&self, available: usize) -> usize {
        if self.max_columns == 0 {
            available
        } else {
            available.min(self.max_columns)
        }
    }
}

/// Trait for rendering an analysis result.
pub trait ResultFormatter {
    /// Renders `result` using the formatter's own configuration.
    fn format(&self, result: &AnalysisResult, metadata: &ReportMetadata) -> Result<String>;
}

/// The fixed-layout text report written next to the other artifacts.
///
/// Layout: header, generation timestamp, shape, completeness and duplicate
/// rate, then one mean/std line per numeric column. Identical inputs give
/// identical output.
#[derive(Debug, Clone, Default)]
pub struct TextReportFormatter {
    config: FormatterConfig,
}

impl TextReportFormatter {
    /// Creates a formatter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl ResultFormatter for TextReportFormatter {
    fn format(&self, result: &AnalysisResult, metadata: &ReportMetadata) -> Result<String> {
        let config = &self.config;
        let rule = "=".repeat(50);
        let mut output = String::new();

        writeln!(output, "{rule}")?;
        writeln!(output, "DATA ANALYSIS REPORT")?;
        writeln!(output, "{rule}")?;
        writeln!(
            output,
            "Generated: {}",
            metadata.generated_at.format(TIMESTAMP_FORMAT)
        )?;
        writeln!(
            output,
            "Data shape: {} rows x {} columns",
            metadata.shape.0, metadata.shape.1
        )?;
        writeln!(output)?;
        let completeness = config.percent(result.completeness);
        let duplicates = config.percent(result.duplicate_ratio);
        writeln!(output, "Completeness: {completeness}")?;
        writeln!(output, "Duplicate rate: {duplicates}")?;
        writeln!(output)?;
        writeln!(output, "Numeric columns:")?;
        if result.numeric.is_empty() {
            writeln!(output, "  (none)")?;
        }
        for summary in &result.numeric {
            writeln!(
                output,
                "  {}: mean={}, std={}",
                summary.column,
                config.number(summary.mean),
                config.number(summary.std)
            )?;
        }

        Ok(output)
    }
}

/// Console summary printed at the end of a run.
#[derive(Debug, Clone, Default)]
pub struct SummaryFormatter {
    config: FormatterConfig,
}

impl SummaryFormatter {
    /// Creates a formatter with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn heading(&self, text: &str) -> String {
        if self.config.use_colors {
            format!("\x1b[1m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl ResultFormatter for SummaryFormatter {
    fn format(&self, result: &AnalysisResult, metadata: &ReportMetadata) -> Result<String> {
        let config = &self.config;
        let mut output = String::new();

        writeln!(output)?;
        writeln!(output, "{}", self.heading("📊 Analysis Summary"))?;
        writeln!(
            output,
            "   Shape: {} rows x {} columns",
            metadata.shape.0, metadata.shape.1
        )?;
        let completeness = config.percent(result.completeness);
        let duplicates = config.percent(result.duplicate_ratio);
        writeln!(output, "   Completeness: {completeness}")?;
        writeln!(output, "   Duplicate rate: {duplicates}")?;

        if let Some(pre) = &result.preprocessing {
            writeln!(
                output,
                "   Preprocessing: {} -> {} rows ({} dropped, {} filled, {} deduped, {} trimmed)",
                pre.rows_in,
                pre.rows_out,
                pre.rows_dropped_missing,
                pre.cells_filled,
                pre.duplicates_removed,
                pre.values_trimmed
            )?;
            for warning in &pre.warnings {
                writeln!(output, "   ⚠️  {}: {}", warning.column, warning.reason)?;
            }
        }

        if !result.numeric.is_empty() {
            writeln!(output)?;
            writeln!(output, "{}", self.heading("Numeric columns"))?;
            let shown = config.limit(result.numeric.len());
            for summary in result.numeric.iter().take(shown) {
                writeln!(
                    output,
                    "   {}: count={} mean={} std={} min={} max={}",
                    summary.column,
                    summary.count,
                    config.number(summary.mean),
                    config.number(summary.std),
                    config.number(summary.min),
                    config.number(summary.max)
                )?;
            }
        }

        if !result.categorical.is_empty() {
            writeln!(output)?;
            writeln!(output, "{}", self.heading("Categorical columns"))?;
            let shown = config.limit(result.categorical.len());
            for summary in result.categorical.iter().take(shown) {
                writeln!(
                    output,
                    "   {}: {} distinct, top={} ({}x)",
                    summary.column,
                    summary.distinct,
                    summary.top.as_deref().unwrap_or("n/a"),
                    summary.top_frequency
                )?;
            }
        }

        if let Some(matrix) = &result.correlations {
            let pairs = matrix.strongest_pairs();
            if !pairs.is_empty() {
                writeln!(output)?;
                writeln!(output, "{}", self.heading("Strongest correlations"))?;
                for (a, b, r) in pairs.iter().take(config.limit(pairs.len()).min(5)) {
                    writeln!(output, "   {a} ~ {b}: {}", config.number(Some(*r)))?;
                }
            }
        }

        Ok(output)
    }
}

/// Formats results as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a pretty-printing JSON formatter.
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Sets whether to pretty-print.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFormatter for JsonFormatter {
    fn format(&self, result: &AnalysisResult, _metadata: &ReportMetadata) -> Result<String> {
        result.to_json(self.pretty)
    }
}
