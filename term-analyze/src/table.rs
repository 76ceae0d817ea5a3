//! Column-classified tabular data backed by an Arrow [`RecordBatch`].
//!
//! A [`Table`] pairs a record batch with a [`ColumnKind`] per column. The
//! classification is computed once, when the table is built, and every later
//! stage reads it from here instead of re-inspecting the data.
//!
//! Numeric columns are always stored as `Float64`, categorical columns as
//! `Utf8`. Missing values are Arrow nulls.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, Float64Array, StringArray};
use arrow::compute::{cast, filter_record_batch};
use arrow::datatypes::{DataType, Field, Float64Type, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// How a column participates in the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Stored as `Float64`; gets descriptive statistics and correlations.
    Numeric,
    /// Stored as `Utf8`; gets a frequency profile.
    Categorical,
}

impl ColumnKind {
    /// Classifies an Arrow data type.
    pub fn classify(data_type: &DataType) -> Self {
        if data_type.is_numeric() {
            Self::Numeric
        } else {
            Self::Categorical
        }
    }

    /// The storage type used for columns of this kind.
    pub fn storage_type(&self) -> DataType {
        match self {
            Self::Numeric => DataType::Float64,
            Self::Categorical => DataType::Utf8,
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => write!(f, "numeric"),
            Self::Categorical => write!(f, "categorical"),
        }
    }
}

/// An immutable table of named, classified columns.
#[derive(Debug, Clone)]
pub struct Table {
    batch: RecordBatch,
    kinds: Vec<ColumnKind>,
}

impl Table {
    /// Builds a table from an arbitrary record batch.
    ///
    /// Each column is classified from its Arrow type and cast to the storage
    /// type of its kind. Column names must be unique.
    pub fn from_record_batch(batch: RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        let mut kinds = Vec::with_capacity(batch.num_columns());
        let mut fields = Vec::with_capacity(batch.num_columns());
        let mut columns = Vec::with_capacity(batch.num_columns());

        for (field, column) in schema.fields().iter().zip(batch.columns()) {
            let kind = ColumnKind::classify(field.data_type());
            let storage = kind.storage_type();
            let column = if column.data_type() == &storage {
                Arc::clone(column)
            } else {
                cast(column, &storage)?
            };
            fields.push(Field::new(field.name(), storage, true));
            columns.push(column);
            kinds.push(kind);
        }

        let batch = build_batch(Arc::new(Schema::new(fields)), columns, batch.num_rows())?;
        Self::try_new(batch, kinds)
    }

    /// Creates a table from an already-normalized batch and its classification.
    pub fn try_new(batch: RecordBatch, kinds: Vec<ColumnKind>) -> Result<Self> {
        if kinds.len() != batch.num_columns() {
            return Err(TermError::Internal(format!(
                "expected {} column kinds, got {}",
                batch.num_columns(),
                kinds.len()
            )));
        }

        let schema = batch.schema();
        let mut seen = HashSet::with_capacity(kinds.len());
        for (field, kind) in schema.fields().iter().zip(&kinds) {
            if !seen.insert(field.name().as_str()) {
                return Err(TermError::Internal(format!(
                    "duplicate column name '{}'",
                    field.name()
                )));
            }
            if field.data_type() != &kind.storage_type() {
                return Err(TermError::Internal(format!(
                    "column '{}' is {kind} but stored as {}",
                    field.name(),
                    field.data_type()
                )));
            }
        }

        Ok(Self { batch, kinds })
    }

    /// Starts building a table from plain vectors.
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows(), self.num_columns())
    }

    /// True when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// The underlying record batch.
    pub fn record_batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// The Arrow schema.
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Name of the column at `index`.
    pub fn column_name(&self, index: usize) -> String {
        self.batch.schema().field(index).name().clone()
    }

    /// Position of the named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.batch.schema().index_of(name).ok()
    }

    /// True if the named column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// The column at `index`.
    pub fn column(&self, index: usize) -> &ArrayRef {
        self.batch.column(index)
    }

    /// Classification of the column at `index`.
    pub fn kind(&self, index: usize) -> ColumnKind {
        self.kinds[index]
    }

    /// All column classifications, in column order.
    pub fn kinds(&self) -> &[ColumnKind] {
        &self.kinds
    }

    /// Indices of numeric columns.
    pub fn numeric_columns(&self) -> Vec<usize> {
        self.indices_of(ColumnKind::Numeric)
    }

    /// Indices of categorical columns.
    pub fn categorical_columns(&self) -> Vec<usize> {
        self.indices_of(ColumnKind::Categorical)
    }

    fn indices_of(&self, kind: ColumnKind) -> Vec<usize> {
        self.kinds
            .iter()
            .enumerate()
            .filter(|(_, k)| **k == kind)
            .map(|(i, _)| i)
            .collect()
    }

    /// A numeric column as a `Float64Array`, or `None` for categorical columns.
    pub fn numeric(&self, index: usize) -> Option<&Float64Array> {
        match self.kinds[index] {
            ColumnKind::Numeric => Some(self.batch.column(index).as_primitive::<Float64Type>()),
            ColumnKind::Categorical => None,
        }
    }

    /// A categorical column as a `StringArray`, or `None` for numeric columns.
    pub fn categorical(&self, index: usize) -> Option<&StringArray> {
        match self.kinds[index] {
            ColumnKind::Categorical => Some(self.batch.column(index).as_string::<i32>()),
            ColumnKind::Numeric => None,
        }
    }

    /// Number of missing cells in the whole table.
    pub fn null_count(&self) -> usize {
        self.batch.columns().iter().map(|c| c.null_count()).sum()
    }

    /// Rows multiplied by columns.
    pub fn total_cells(&self) -> usize {
        self.num_rows() * self.num_columns()
    }

    /// Mask that is `true` for rows without any missing cell.
    pub fn complete_rows(&self) -> BooleanArray {
        (0..self.num_rows())
            .map(|row| Some(self.batch.columns().iter().all(|c| c.is_valid(row))))
            .collect()
    }

    /// Returns a new table keeping only the rows where `mask` is `true`.
    pub fn filter_rows(&self, mask: &BooleanArray) -> Result<Self> {
        let batch = if self.num_columns() == 0 {
            let kept = mask.true_count();
            build_batch(self.batch.schema(), vec![], kept)?
        } else {
            filter_record_batch(&self.batch, mask)?
        };
        Ok(Self {
            batch,
            kinds: self.kinds.clone(),
        })
    }

    /// Returns a new table with the column at `index` replaced.
    ///
    /// The replacement must have the same length and storage type.
    pub fn replace_column(&self, index: usize, column: ArrayRef) -> Result<Self> {
        let mut columns = self.batch.columns().to_vec();
        columns[index] = column;
        let batch = build_batch(self.batch.schema(), columns, self.num_rows())?;
        Self::try_new(batch, self.kinds.clone())
    }

    /// Returns a new table with the column at `index` replaced by one of
    /// another kind, stored as that kind's storage type.
    pub fn retype_column(&self, index: usize, column: ArrayRef, kind: ColumnKind) -> Result<Self> {
        let schema = self.batch.schema();
        let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
        fields[index] = Field::new(schema.field(index).name(), kind.storage_type(), true);

        let mut columns = self.batch.columns().to_vec();
        columns[index] = column;
        let mut kinds = self.kinds.clone();
        kinds[index] = kind;

        let batch = build_batch(Arc::new(Schema::new(fields)), columns, self.num_rows())?;
        Self::try_new(batch, kinds)
    }
}

fn build_batch(schema: SchemaRef, columns: Vec<ArrayRef>, rows: usize) -> Result<RecordBatch> {
    let opts = RecordBatchOptions::new().with_row_count(Some(rows));
    let batch = RecordBatch::try_new_with_options(schema, columns, &opts)?;
    Ok(batch)
}

/// Builds a [`Table`] column by column from plain vectors.
///
/// ```rust
/// use term_analyze::table::{ColumnKind, Table};
///
/// let table = Table::builder()
///     .numeric("age", vec![Some(31.0), None, Some(45.0)])
///     .categorical("city", vec![Some("Oslo"), Some("Lima"), None])
///     .build()
///     .unwrap();
///
/// assert_eq!(table.shape(), (3, 2));
/// assert_eq!(table.kind(1), ColumnKind::Categorical);
/// ```
#[derive(Debug, Default)]
pub struct TableBuilder {
    fields: Vec<Field>,
    columns: Vec<ArrayRef>,
    kinds: Vec<ColumnKind>,
}

impl TableBuilder {
    /// Appends a numeric column.
    pub fn numeric(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let field = Field::new(name.into(), DataType::Float64, true);
        self.fields.push(field);
        self.columns.push(Arc::new(Float64Array::from(values)));
        self.kinds.push(ColumnKind::Numeric);
        self
    }

    /// Appends a categorical column.
    pub fn categorical<S: AsRef<str>>(
        mut self,
        name: impl Into<String>,
        values: Vec<Option<S>>,
    ) -> Self {
        let array: StringArray = values
            .iter()
            .map(|v| v.as_ref().map(|s| s.as_ref()))
            .collect();
        let field = Field::new(name.into(), DataType::Utf8, true);
        self.fields.push(field);
        self.columns.push(Arc::new(array));
        self.kinds.push(ColumnKind::Categorical);
        self
    }

    /// Builds the table, checking that all columns have the same length.
    pub fn build(self) -> Result<Table> {
        let rows = self.columns.first().map(|c| c.len()).unwrap_or(0);
        let batch = build_batch(Arc::new(Schema::new(self.fields)), self.columns, rows)?;
        Table::try_new(batch, self.kinds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{BooleanArray, Int64Array};

    fn sample() -> Table {
        Table::builder()
            .numeric("id", vec![Some(1.0), Some(2.0), None])
            .categorical("name", vec![Some("a"), None, Some("c")])
            .build()
            .unwrap()
    }

    #[test]
    fn test_classification_casts_to_storage_types() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("n", DataType::Int64, true),
            Field::new("flag", DataType::Boolean, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![Some(1), None])) as ArrayRef,
                Arc::new(BooleanArray::from(vec![Some(true), Some(false)])) as ArrayRef,
            ],
        )
        .unwrap();

        let table = Table::from_record_batch(batch).unwrap();
        assert_eq!(table.kind(0), ColumnKind::Numeric);
        assert_eq!(table.kind(1), ColumnKind::Categorical);
        assert_eq!(table.numeric(0).unwrap().value(0), 1.0);
        assert!(table.numeric(0).unwrap().is_null(1));
        assert_eq!(table.categorical(1).unwrap().value(0), "true");
    }

    #[test]
    fn test_shape_and_nulls() {
        let table = sample();
        assert_eq!(table.shape(), (3, 2));
        assert_eq!(table.null_count(), 2);
        assert_eq!(table.total_cells(), 6);
        assert_eq!(table.numeric_columns(), vec![0]);
        assert_eq!(table.categorical_columns(), vec![1]);
    }

    #[test]
    fn test_complete_rows_and_filter() {
        let table = sample();
        let mask = table.complete_rows();
        assert_eq!(mask.true_count(), 1);

        let filtered = table.filter_rows(&mask).unwrap();
        assert_eq!(filtered.shape(), (1, 2));
        assert_eq!(filtered.categorical(1).unwrap().value(0), "a");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = Table::builder()
            .numeric("x", vec![Some(1.0)])
            .numeric("x", vec![Some(2.0)])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let result = Table::builder()
            .numeric("x", vec![Some(1.0), Some(2.0)])
            .numeric("y", vec![Some(2.0)])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_retype_column() {
        let table = sample();
        let parsed = Arc::new(Float64Array::from(vec![Some(1.5), None, Some(3.0)]));
        let retyped = table.retype_column(1, parsed, ColumnKind::Numeric).unwrap();

        assert_eq!(retyped.numeric_columns(), vec![0, 1]);
        assert_eq!(retyped.column_names(), table.column_names());
        assert_eq!(retyped.numeric(1).unwrap().value(2), 3.0);

        let wrong = Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0]));
        let mismatched = table.retype_column(1, wrong, ColumnKind::Categorical);
        assert!(mismatched.is_err());
    }

    #[test]
    fn test_replace_column() {
        let table = sample();
        let replaced = table
            .replace_column(0, Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0])))
            .unwrap();
        assert_eq!(replaced.null_count(), 1);
        assert_eq!(table.null_count(), 2);
    }
}
