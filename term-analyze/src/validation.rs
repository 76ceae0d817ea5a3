//! Schema checks run right after loading.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::prelude::*;

/// Column names a table must contain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequiredColumns(Vec<String>);

impl RequiredColumns {
    /// Creates the list from any iterable of names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// True when nothing is required.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The required names.
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Checks `table` against this list.
    pub fn validate(&self, table: &Table) -> Result<()> {
        validate_required_columns(table, &self.0)
    }
}

impl<S: Into<String>> FromIterator<S> for RequiredColumns {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Fails with [`TermError::MissingColumns`] naming every absent column.
///
/// Every name is checked, so the error lists all of them rather than the
/// first one found. Names are reported once each, in request order.
#[instrument(skip(table, required), fields(required = required.len()))]
pub fn validate_required_columns<S: AsRef<str>>(table: &Table, required: &[S]) -> Result<()> {
    let mut missing: Vec<String> = Vec::new();
    for name in required.iter().map(AsRef::as_ref) {
        if !table.has_column(name) && !missing.iter().any(|m| m == name) {
            missing.push(name.to_string());
        }
    }

    if missing.is_empty() {
        debug!("All required columns present");
        Ok(())
    } else {
        warn!(missing = ?missing, "Required columns are missing");
        Err(TermError::MissingColumns { missing })
    }
}
