//! # term-analyze - Tabular Data Profiling for Rust
//!
//! term-analyze loads a delimited text file into an Arrow-backed table,
//! checks that the columns you rely on are there, cleans it, computes a
//! statistical profile and writes the results in several formats.
//!
//! ## Overview
//!
//! A run is a straight line of stages, each consuming the previous stage's
//! output:
//!
//! ```text
//! Loader -> Validator -> Preprocessor -> Analyzer -> { Reporter, Writer }
//! ```
//!
//! - **Loader** ([`sources`]): reads CSV/TSV, infers numeric vs categorical
//!   columns, maps missing-value tokens to nulls
//! - **Validator** ([`validation`]): fails with every missing required column
//! - **Preprocessor** ([`preprocess`]): drop or fill missing values, remove
//!   duplicate rows, normalize whitespace
//! - **Analyzer** ([`analyzers`]): descriptive statistics, correlations,
//!   categorical summaries, completeness and duplicate ratio
//! - **Reporter** ([`formatters`]): fixed-layout text report and console
//!   summary
//! - **Writer** ([`writers`]): `P.csv`, `P.xlsx`, `P.json`, `P_report.txt`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use term_analyze::prelude::*;
//! use term_analyze::analyzers::{analyze, AnalysisConfig};
//! use term_analyze::preprocess::{preprocess, FillMethod, PreprocessConfig};
//! use term_analyze::sources::load_csv;
//! use term_analyze::validation::validate_required_columns;
//!
//! # fn example() -> Result<()> {
//! let table = load_csv("data/example.csv")?;
//! validate_required_columns(&table, &["id", "age"])?;
//!
//! let cleaned = preprocess(&table, &PreprocessConfig::fill(FillMethod::Mean))?;
//! let result = analyze(&cleaned.table, &AnalysisConfig::default())?;
//!
//! println!("completeness: {:?}", result.completeness);
//! # Ok(())
//! # }
//! ```
//!
//! For a whole run with artifact output, see [`pipeline::Pipeline`].
//!
//! ## Errors
//!
//! Every fallible operation returns [`error::Result`]. Loading and
//! validation errors abort a run. Column-level preprocessing problems and
//! artifact write failures are collected and reported instead.

pub mod analyzers;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod pipeline;
pub mod prelude;
pub mod preprocess;
pub mod sources;
pub mod table;
pub mod validation;
pub mod writers;
