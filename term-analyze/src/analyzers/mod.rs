//! Statistical analysis of a preprocessed table.
//!
//! ## Available Analyzers
//!
//! - **Descriptive** (`descriptive`): count, mean, sample std, min, quartiles, max
//!   per numeric column
//! - **Correlation** (`correlation`): pairwise Pearson matrix over numeric columns
//! - **Categorical** (`categorical`): distinct count and most frequent value per
//!   text column
//! - **Metrics** (`metrics`): completeness and duplicate ratio for the table
//!
//! [`AnalysisRunner`] runs all of them and returns an immutable
//! [`AnalysisResult`].
//!
//! ```rust
//! use term_analyze::analyzers::{analyze, AnalysisConfig};
//! use term_analyze::table::Table;
//!
//! let table = Table::builder()
//!     .numeric("score", vec![Some(3.0), None, Some(5.0)])
//!     .categorical("team", vec![Some("red"), Some("blue"), Some("red")])
//!     .build()
//!     .unwrap();
//!
//! let result = analyze(&table, &AnalysisConfig::default()).unwrap();
//! assert_eq!(result.numeric_summary("score").unwrap().mean, Some(4.0));
//! assert_eq!(result.categorical_summary("team").unwrap().top.as_deref(), Some("red"));
//! ```

use serde::{Deserialize, Serialize};

use crate::prelude::*;

pub mod categorical;
pub mod correlation;
pub mod descriptive;
pub mod metrics;
pub mod result;
pub mod runner;

pub use result::{AnalysisResult, CategoricalSummary, CorrelationMatrix, NumericSummary};
pub use runner::{AnalysisRunner, ProgressCallback};

/// Options for the analysis stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Compute the correlation matrix between numeric columns
    pub compute_correlations: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            compute_correlations: true,
        }
    }
}

impl AnalysisConfig {
    /// Sets whether to compute correlations.
    pub fn with_correlations(mut self, enabled: bool) -> Self {
        self.compute_correlations = enabled;
        self
    }
}

/// Analyzes a table with the given configuration.
pub fn analyze(table: &Table, config: &AnalysisConfig) -> Result<AnalysisResult> {
    AnalysisRunner::with_config(config.clone()).run(table)
}
