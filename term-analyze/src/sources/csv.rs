//! CSV file source implementation.

use super::DataSource;
use crate::prelude::*;
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{Field, Schema};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{ErrorKind, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A number as CSV type inference accepts it, without surrounding whitespace.
static NUMBER: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^-?(\d+|\d*\.\d+|\d+\.\d*)([eE][-+]?\d+)?$")
        .expect("Hard-coded regex pattern should be valid")
});

/// Tokens read as missing values unless overridden.
pub const DEFAULT_NULL_VALUES: &[&str] = &[
    "", "NA", "N/A", "#N/A", "NaN", "nan", "null", "NULL", "None",
];

/// Options for configuring CSV file reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field delimiter (default: ',', or '\t' for `.tsv` files)
    pub delimiter: Option<u8>,
    /// Quote character (default: '"')
    pub quote: u8,
    /// Cell contents that mean "missing"
    pub null_values: Vec<String>,
    /// Maximum records to read for schema inference (None reads the whole file)
    pub schema_infer_max_records: Option<usize>,
    /// Rows per Arrow batch while reading
    pub batch_size: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            quote: b'"',
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect(),
            schema_infer_max_records: None,
            batch_size: 8192,
        }
    }
}

impl CsvOptions {
    /// Sets the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Sets the quote character.
    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = quote;
        self
    }

    /// Replaces the list of missing-value tokens.
    pub fn with_null_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Limits schema inference to the first `records` rows.
    pub fn with_schema_infer_max_records(mut self, records: usize) -> Self {
        self.schema_infer_max_records = Some(records);
        self
    }

    fn delimiter_for(&self, path: &Path) -> u8 {
        if let Some(delimiter) = self.delimiter {
            return delimiter;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        }
    }

    fn null_regex(&self) -> Result<Regex> {
        let alternatives = self
            .null_values
            .iter()
            .map(|v| regex::escape(v))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!("^(?:{alternatives})$");
        Regex::new(&pattern).map_err(|e| TermError::Internal(format!("bad null tokens: {e}")))
    }
}

/// A CSV file data source with schema inference.
///
/// The first line is the header. Column types are inferred from the data:
/// integer and floating point columns become numeric, everything else
/// (booleans, dates, free text) becomes categorical.
///
/// # Examples
///
/// ```rust,no_run
/// use term_analyze::sources::{CsvOptions, CsvSource, DataSource};
///
/// # fn example() -> term_analyze::prelude::Result<()> {
/// let table = CsvSource::new("data/users.csv").load()?;
///
/// let options = CsvOptions::default().with_delimiter(b';');
/// let table = CsvSource::with_options("data/users_eu.csv", options).load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a new CSV source from a file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: CsvOptions::default(),
        }
    }

    /// Creates a new CSV source with custom options.
    pub fn with_options(path: impl Into<PathBuf>, options: CsvOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    /// The file this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<File> {
        let not_found = || TermError::FileNotFound {
            path: self.path.clone(),
        };

        let metadata = std::fs::metadata(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => not_found(),
            _ => TermError::Io(e),
        })?;
        if !metadata.is_file() {
            return Err(not_found());
        }
        if metadata.len() == 0 {
            return Err(TermError::EmptyData {
                path: self.path.clone(),
            });
        }

        File::open(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => not_found(),
            _ => TermError::Io(e),
        })
    }
}

impl DataSource for CsvSource {
    #[instrument(skip(self), fields(source.type = "csv", path = %self.path.display()))]
    fn load(&self) -> Result<Table> {
        let path = self.path.as_path();
        let delimiter = self.options.delimiter_for(path);
        let null_regex = self.options.null_regex()?;
        let mut file = self.open()?;

        let format = Format::default()
            .with_header(true)
            .with_delimiter(delimiter)
            .with_quote(self.options.quote)
            .with_null_regex(null_regex.clone());
        let (inferred, records) = format
            .infer_schema(&mut file, self.options.schema_infer_max_records)
            .map_err(|e| TermError::parse_with_source(path, e))?;

        if inferred.fields().is_empty() || records == 0 {
            return Err(TermError::EmptyData {
                path: path.to_path_buf(),
            });
        }

        let schema = Arc::new(unique_field_names(&inferred));
        debug!(schema = ?schema, records, "Inferred CSV schema");

        file.rewind()?;
        let reader = ReaderBuilder::new(Arc::clone(&schema))
            .with_header(true)
            .with_delimiter(delimiter)
            .with_quote(self.options.quote)
            .with_null_regex(null_regex.clone())
            .with_batch_size(self.options.batch_size)
            .build(file)
            .map_err(|e| TermError::parse_with_source(path, e))?;

        let batches = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| TermError::parse_with_source(path, e))?;
        let batch = concat_batches(&schema, &batches)?;

        if batch.num_rows() == 0 {
            return Err(TermError::EmptyData {
                path: path.to_path_buf(),
            });
        }

        let table = mark_null_tokens(Table::from_record_batch(batch)?, &null_regex)?;
        let table = parse_padded_numbers(table)?;

        info!(
            path = %path.display(),
            rows = table.num_rows(),
            columns = table.num_columns(),
            numeric = table.numeric_columns().len(),
            categorical = table.categorical_columns().len(),
            "Loaded CSV data"
        );
        Ok(table)
    }

    fn description(&self) -> String {
        format!("CSV file {}", self.path.display())
    }
}

/// Loads a CSV file with default options.
pub fn load_csv(path: impl AsRef<Path>) -> Result<Table> {
    CsvSource::new(path.as_ref()).load()
}

/// Renames repeated header names to `name.1`, `name.2`, ...
fn unique_field_names(schema: &Schema) -> Schema {
    let mut taken: HashSet<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut fields = Vec::with_capacity(schema.fields().len());

    for field in schema.fields() {
        let name = field.name();
        let count = seen.entry(name.clone()).or_insert(0);
        if *count == 0 {
            *count = 1;
            fields.push(field.as_ref().clone());
            continue;
        }

        let mut suffix = *count;
        let mut candidate = format!("{name}.{suffix}");
        while taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{name}.{suffix}");
        }
        *count = suffix + 1;
        taken.insert(candidate.clone());
        fields.push(Field::new(candidate, field.data_type().clone(), true));
    }

    Schema::new(fields)
}

/// Turns missing-value tokens in text columns into nulls.
fn mark_null_tokens(mut table: Table, null_regex: &Regex) -> Result<Table> {
    for index in table.categorical_columns() {
        let Some(column) = table.categorical(index) else {
            continue;
        };
        let has_tokens = column.iter().flatten().any(|v| null_regex.is_match(v));
        if !has_tokens {
            continue;
        }

        let cleaned: StringArray = column
            .iter()
            .map(|v| v.filter(|s| !null_regex.is_match(s)))
            .collect();
        table = table.replace_column(index, Arc::new(cleaned) as ArrayRef)?;
    }
    Ok(table)
}

/// Reads text columns holding only whitespace-padded numbers as numeric.
///
/// Type inference rejects `" 3 "`; every present cell of such a column must
/// be a number once trimmed, and at least one must carry padding.
fn parse_padded_numbers(mut table: Table) -> Result<Table> {
    for index in table.categorical_columns() {
        let Some(column) = table.categorical(index) else {
            continue;
        };
        let padded = column.iter().flatten().any(|v| v.trim() != v);
        let numeric = column.iter().flatten().all(|v| NUMBER.is_match(v.trim()));
        if !padded || !numeric {
            continue;
        }

        let values: Float64Array = column
            .iter()
            .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
            .collect();
        debug!(column = %table.column_name(index), "Parsed padded numbers");
        table = table.retype_column(index, Arc::new(values), ColumnKind::Numeric)?;
    }
    Ok(table)
}
