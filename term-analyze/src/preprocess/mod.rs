//! Cleaning steps applied between loading and analysis.
//!
//! The stages always run in this order, each on the output of the previous
//! one:
//!
//! 1. missing values: drop incomplete rows, or fill them per column
//! 2. deduplication: drop rows that repeat an earlier row
//! 3. text cleaning: trim and collapse whitespace in categorical columns
//!
//! A fill method that does not apply to a column (mean on text, say) is not
//! fatal: the column is left as it is and an
//! [`TermError::InvalidConfig`] warning is recorded in the summary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::prelude::*;

pub mod dedupe;
pub mod missing;
pub mod text;

/// How missing values are filled when rows are not dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillMethod {
    /// Column mean (numeric columns only)
    Mean,
    /// Column median (numeric columns only)
    Median,
    /// Most frequent value, first seen wins ties
    Mode,
    /// Last value seen above the gap
    Forward,
    /// Next value seen below the gap
    Backward,
    /// Leave missing values alone
    #[default]
    None,
}

impl FillMethod {
    /// All methods, in the order they are documented.
    pub const ALL: [FillMethod; 6] = [
        FillMethod::Mean,
        FillMethod::Median,
        FillMethod::Mode,
        FillMethod::Forward,
        FillMethod::Backward,
        FillMethod::None,
    ];

    /// Lowercase name, as used on the command line and in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            FillMethod::Mean => "mean",
            FillMethod::Median => "median",
            FillMethod::Mode => "mode",
            FillMethod::Forward => "forward",
            FillMethod::Backward => "backward",
            FillMethod::None => "none",
        }
    }

    /// Whether the method only makes sense for numeric columns.
    pub fn is_numeric_only(&self) -> bool {
        matches!(self, FillMethod::Mean | FillMethod::Median)
    }
}

impl fmt::Display for FillMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FillMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        FillMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .or(match lower.as_str() {
                "ffill" => Some(FillMethod::Forward),
                "bfill" => Some(FillMethod::Backward),
                _ => None,
            })
            .ok_or_else(|| {
                let expected = "mean, median, mode, forward, backward, none";
                format!("unknown fill method '{s}', expected one of: {expected}")
            })
    }
}

/// Preprocessing options.
///
/// `drop_missing` takes precedence over `fill_method`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Remove every row that has a missing cell
    pub drop_missing: bool,
    /// Fill method used when rows are kept
    pub fill_method: FillMethod,
    /// Remove rows that repeat an earlier row
    pub dedupe: bool,
    /// Trim and collapse whitespace in text values
    pub trim_text: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            drop_missing: true,
            fill_method: FillMethod::None,
            dedupe: false,
            trim_text: false,
        }
    }
}

impl PreprocessConfig {
    /// Keeps every row and fills missing values with `method`.
    pub fn fill(method: FillMethod) -> Self {
        Self {
            drop_missing: false,
            fill_method: method,
            ..Self::default()
        }
    }

    /// Changes nothing.
    pub fn passthrough() -> Self {
        Self {
            drop_missing: false,
            fill_method: FillMethod::None,
            dedupe: false,
            trim_text: false,
        }
    }

    /// Sets whether incomplete rows are dropped.
    pub fn with_drop_missing(mut self, enabled: bool) -> Self {
        self.drop_missing = enabled;
        self
    }

    /// Sets the fill method.
    pub fn with_fill_method(mut self, method: FillMethod) -> Self {
        self.fill_method = method;
        self
    }

    /// Sets whether duplicate rows are removed.
    pub fn with_dedupe(mut self, enabled: bool) -> Self {
        self.dedupe = enabled;
        self
    }

    /// Sets whether text values are trimmed.
    pub fn with_trim_text(mut self, enabled: bool) -> Self {
        self.trim_text = enabled;
        self
    }
}

/// A column that a preprocessing option could not be applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnWarning {
    pub column: String,
    pub reason: String,
}

impl ColumnWarning {
    pub(crate) fn new(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// The warning as an [`TermError::InvalidConfig`].
    pub fn to_error(&self) -> TermError {
        TermError::invalid_config(&self.column, &self.reason)
    }
}

/// What preprocessing did to the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreprocessSummary {
    pub rows_in: usize,
    pub rows_dropped_missing: usize,
    pub cells_filled: usize,
    pub duplicates_removed: usize,
    pub values_trimmed: usize,
    pub rows_out: usize,
    #[serde(default)]
    pub warnings: Vec<ColumnWarning>,
}

impl PreprocessSummary {
    /// Rows that reached the deduplication stage.
    pub fn rows_before_dedupe(&self) -> usize {
        self.rows_in.saturating_sub(self.rows_dropped_missing)
    }
}

/// The cleaned table together with its summary.
#[derive(Debug, Clone)]
pub struct PreprocessOutcome {
    pub table: Table,
    pub summary: PreprocessSummary,
}

impl PreprocessOutcome {
    /// Per-column warnings as [`TermError::InvalidConfig`] values.
    pub fn warnings(&self) -> Vec<TermError> {
        let warnings = &self.summary.warnings;
        warnings.iter().map(ColumnWarning::to_error).collect()
    }
}

/// Applies a [`PreprocessConfig`] to tables.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    config: PreprocessConfig,
    log: LogConfig,
}

impl Preprocessor {
    /// Creates a preprocessor for the given configuration.
    pub fn new(config: PreprocessConfig) -> Self {
        Self {
            config,
            log: LogConfig::default(),
        }
    }

    /// Sets the logging configuration.
    pub fn with_log_config(mut self, log: LogConfig) -> Self {
        self.log = log;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Runs every enabled stage and returns a new table.
    #[instrument(skip(self, table), fields(rows = table.num_rows(), config = ?self.config))]
    pub fn run(&self, table: &Table) -> Result<PreprocessOutcome> {
        let mut summary = PreprocessSummary {
            rows_in: table.num_rows(),
            ..PreprocessSummary::default()
        };

        let mut current = if self.config.drop_missing {
            let (cleaned, dropped) = missing::drop_incomplete_rows(table)?;
            summary.rows_dropped_missing = dropped;
            cleaned
        } else if self.config.fill_method != FillMethod::None {
            let filled = missing::fill_missing(table, self.config.fill_method, &self.log)?;
            summary.cells_filled = filled.cells_filled;
            summary.warnings = filled.warnings;
            filled.table
        } else {
            table.clone()
        };

        if self.config.dedupe {
            let (deduped, removed) = dedupe::drop_duplicate_rows(&current)?;
            summary.duplicates_removed = removed;
            current = deduped;
        }

        if self.config.trim_text {
            let (trimmed, changed) = text::clean_text_columns(&current)?;
            summary.values_trimmed = changed;
            current = trimmed;
        }

        summary.rows_out = current.num_rows();
        for warning in &summary.warnings {
            warn!(
                column = %warning.column,
                reason = %warning.reason,
                "Column skipped during preprocessing"
            );
        }
        info!(
            rows_in = summary.rows_in,
            rows_out = summary.rows_out,
            dropped = summary.rows_dropped_missing,
            filled = summary.cells_filled,
            duplicates = summary.duplicates_removed,
            trimmed = summary.values_trimmed,
            "Preprocessing complete"
        );

        Ok(PreprocessOutcome {
            table: current,
            summary,
        })
    }
}

/// Preprocesses a table with the given configuration.
pub fn preprocess(table: &Table, config: &PreprocessConfig) -> Result<PreprocessOutcome> {
    Preprocessor::new(config.clone()).run(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_method_parsing() {
        assert_eq!("mean".parse::<FillMethod>().unwrap(), FillMethod::Mean);
        let backward = "Backward".parse::<FillMethod>().unwrap();
        assert_eq!(backward, FillMethod::Backward);
        assert_eq!("ffill".parse::<FillMethod>().unwrap(), FillMethod::Forward);
        assert!("average".parse::<FillMethod>().is_err());
        for method in FillMethod::ALL {
            assert_eq!(method.to_string().parse::<FillMethod>().unwrap(), method);
        }
    }

    #[test]
    fn test_config_presets() {
        let default = PreprocessConfig::default();
        assert!(default.drop_missing);
        assert_eq!(default.fill_method, FillMethod::None);

        let fill = PreprocessConfig::fill(FillMethod::Median).with_dedupe(true);
        assert!(!fill.drop_missing);
        assert!(fill.dedupe);
        assert_eq!(fill.fill_method, FillMethod::Median);
    }

    #[test]
    fn test_config_json_uses_lowercase_names() {
        let json = serde_json::to_string(&PreprocessConfig::fill(FillMethod::Forward)).unwrap();
        assert!(json.contains("\"fill_method\":\"forward\""));

        let parsed: PreprocessConfig = serde_json::from_str(r#"{"fill_method":"mode"}"#).unwrap();
        assert_eq!(parsed.fill_method, FillMethod::Mode);
        assert!(parsed.drop_missing);
    }

    #[test]
    fn test_stage_order_drop_then_dedupe_then_trim() {
        let table = Table::builder()
            .numeric("n", vec![Some(1.0), Some(1.0), None, Some(1.0)])
            .categorical("s", vec![Some(" a "), Some(" a "), Some("b"), Some("a")])
            .build()
            .unwrap();
        let config = PreprocessConfig::default()
            .with_dedupe(true)
            .with_trim_text(true);

        let outcome = preprocess(&table, &config).unwrap();
        // " a " and "a" only become equal after deduplication has run
        assert_eq!(outcome.table.num_rows(), 2);
        assert_eq!(outcome.summary.rows_dropped_missing, 1);
        assert_eq!(outcome.summary.duplicates_removed, 1);
        assert_eq!(outcome.summary.values_trimmed, 1);
        assert_eq!(outcome.summary.rows_out, 2);
    }

    #[test]
    fn test_passthrough_returns_same_shape() {
        let table = Table::builder()
            .numeric("n", vec![Some(1.0), None])
            .build()
            .unwrap();
        let outcome = preprocess(&table, &PreprocessConfig::passthrough()).unwrap();
        assert_eq!(outcome.table.shape(), (2, 1));
        assert_eq!(outcome.table.null_count(), 1);
    }
}
