//! The analysis result and its per-column summaries.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::prelude::*;
use crate::preprocess::PreprocessSummary;

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    /// Non-missing values
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Frequency profile for one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub column: String,
    /// Non-missing values
    pub count: usize,
    pub missing: usize,
    /// Distinct non-missing values
    pub distinct: usize,
    /// Most frequent value; ties go to the first one seen
    pub top: Option<String>,
    pub top_frequency: usize,
}

/// Pairwise Pearson correlations between numeric columns.
///
/// `values[i][j]` is the correlation of `columns[i]` with `columns[j]`, or
/// `None` when the pair has fewer than two jointly non-missing rows or one
/// side has no variance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlation between two named columns.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    /// Distinct column pairs ordered by decreasing absolute correlation.
    pub fn strongest_pairs(&self) -> Vec<(&str, &str, f64)> {
        let mut pairs = Vec::new();
        for (i, row) in self.values.iter().enumerate() {
            for (j, value) in row.iter().enumerate().skip(i + 1) {
                if let Some(value) = value {
                    pairs.push((self.columns[i].as_str(), self.columns[j].as_str(), *value));
                }
            }
        }
        pairs.sort_by(|a, b| b.2.abs().total_cmp(&a.2.abs()));
        pairs
    }
}

/// Everything the analyzer learned about one table.
///
/// Built once from a table snapshot and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub row_count: usize,
    pub column_count: usize,
    pub numeric: Vec<NumericSummary>,
    pub categorical: Vec<CategoricalSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlations: Option<CorrelationMatrix>,
    /// Non-missing cells over all cells; `None` for an empty table
    pub completeness: Option<f64>,
    /// Duplicate rows over rows considered; `None` when there were no rows
    pub duplicate_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preprocessing: Option<PreprocessSummary>,
}

impl AnalysisResult {
    /// `(rows, columns)` of the analyzed table.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count, self.column_count)
    }

    /// Summary of the named numeric column.
    pub fn numeric_summary(&self, column: &str) -> Option<&NumericSummary> {
        self.numeric.iter().find(|s| s.column == column)
    }

    /// Summary of the named categorical column.
    pub fn categorical_summary(&self, column: &str) -> Option<&CategoricalSummary> {
        self.categorical.iter().find(|s| s.column == column)
    }

    /// Serializes to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Deserializes from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a result previously written as JSON.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Reads a result from a JSON file.
    pub fn read_json(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}
