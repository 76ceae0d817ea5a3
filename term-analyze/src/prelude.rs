//! Prelude for commonly used types and traits in term-analyze.

pub use crate::error::{Result, TermError};
pub use crate::formatters::{FormatterConfig, ResultFormatter};
pub use crate::logging::LogConfig;
pub use crate::table::{ColumnKind, Table};
