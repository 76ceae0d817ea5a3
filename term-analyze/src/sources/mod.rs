//! Data sources that load a [`Table`](crate::table::Table) from disk.
//!
//! Only delimited text is supported today. Sources are synchronous: the file
//! handle is opened, read and closed inside a single [`DataSource::load`]
//! call, on every exit path.

use crate::prelude::*;
use std::fmt::Debug;

mod csv;

pub use csv::{load_csv, CsvOptions, CsvSource};

/// A source that can produce a classified table.
///
/// # Examples
///
/// ```rust,no_run
/// use term_analyze::sources::{CsvSource, DataSource};
///
/// # fn example() -> term_analyze::prelude::Result<()> {
/// let source = CsvSource::new("data/example.csv");
/// let table = source.load()?;
/// println!("{} loaded {} rows", source.description(), table.num_rows());
/// # Ok(())
/// # }
/// ```
pub trait DataSource: Debug {
    /// Reads the whole source into memory.
    fn load(&self) -> Result<Table>;

    /// Human-readable description, used in log lines.
    fn description(&self) -> String;
}
