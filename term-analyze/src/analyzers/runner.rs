//! Orchestration of the individual analyzers over one table.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::result::AnalysisResult;
use super::{categorical, correlation, descriptive, metrics, AnalysisConfig};
use crate::prelude::*;
use crate::preprocess::PreprocessSummary;

/// Type alias for progress callback function.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Runs every analyzer over a table and assembles an [`AnalysisResult`].
///
/// # Example
///
/// ```rust
/// use term_analyze::analyzers::AnalysisRunner;
/// use term_analyze::table::Table;
///
/// let table = Table::builder()
///     .numeric("x", vec![Some(1.0), Some(2.0), Some(3.0)])
///     .numeric("y", vec![Some(2.0), Some(4.0), Some(7.0)])
///     .build()
///     .unwrap();
///
/// let result = AnalysisRunner::new()
///     .with_correlations(true)
///     .on_progress(|progress| println!("analysis {:.0}%", progress * 100.0))
///     .run(&table)
///     .unwrap();
///
/// assert_eq!(result.numeric.len(), 2);
/// assert!(result.correlations.is_some());
/// ```
#[derive(Clone, Default)]
pub struct AnalysisRunner {
    config: AnalysisConfig,
    preprocessing: Option<PreprocessSummary>,
    on_progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for AnalysisRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisRunner")
            .field("config", &self.config)
            .field("preprocessing", &self.preprocessing)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl AnalysisRunner {
    /// Creates a runner with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner with the given configuration.
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Enables or disables the correlation matrix.
    pub fn with_correlations(mut self, enabled: bool) -> Self {
        self.config.compute_correlations = enabled;
        self
    }

    /// Attaches what preprocessing did, so the duplicate ratio covers
    /// removed duplicates and the summary is carried into the result.
    pub fn with_preprocess_summary(mut self, summary: PreprocessSummary) -> Self {
        self.preprocessing = Some(summary);
        self
    }

    /// Sets a callback invoked with the fraction of work done.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    fn report_progress(&self, progress: f64) {
        if let Some(callback) = &self.on_progress {
            callback(progress);
        }
    }

    /// Analyzes a table snapshot.
    #[instrument(skip(self, table), fields(rows = table.num_rows(), columns = table.num_columns()))]
    pub fn run(&self, table: &Table) -> Result<AnalysisResult> {
        let numeric = table
            .numeric_columns()
            .into_iter()
            .filter_map(|i| {
                let column = table.numeric(i)?;
                Some(descriptive::describe_column(&table.column_name(i), column))
            })
            .collect::<Vec<_>>();
        debug!(columns = numeric.len(), "Computed descriptive statistics");
        self.report_progress(0.25);

        let categorical = table
            .categorical_columns()
            .into_iter()
            .filter_map(|i| {
                let column = table.categorical(i)?;
                Some(categorical::summarize_column(&table.column_name(i), column))
            })
            .collect::<Vec<_>>();
        debug!(
            columns = categorical.len(),
            "Computed categorical summaries"
        );
        self.report_progress(0.5);

        let correlations = if self.config.compute_correlations {
            correlation::correlation_matrix(table)
        } else {
            None
        };
        self.report_progress(0.75);

        let detected = metrics::duplicate_count(table)?;
        let duplicate_ratio =
            metrics::duplicate_ratio(detected, table.num_rows(), self.preprocessing.as_ref());
        let completeness = metrics::completeness(table);
        self.report_progress(1.0);

        info!(
            numeric = numeric.len(),
            categorical = categorical.len(),
            correlations = correlations.is_some(),
            completeness = ?completeness,
            duplicate_ratio = ?duplicate_ratio,
            "Analysis complete"
        );

        Ok(AnalysisResult {
            row_count: table.num_rows(),
            column_count: table.num_columns(),
            numeric,
            categorical,
            correlations,
            completeness,
            duplicate_ratio,
            preprocessing: self.preprocessing.clone(),
        })
    }
}
