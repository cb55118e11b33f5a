// driftwatch-core/src/domain/dataset/mod.rs

// In-memory tabular model shared by the loader and the analyzer.
// A Dataset is read-only once built and lives for a single pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::domain::error::DomainError;

/// Closed set of column kinds. Each kind maps to exactly one drift test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
    Datetime,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Datetime => "datetime",
        };
        f.write_str(label)
    }
}

/// Typed storage for one column. `None` is a null cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
    Datetime(Vec<Option<DateTime<Utc>>>),
}

impl ColumnValues {
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnValues::Numeric(_) => ColumnKind::Numeric,
            ColumnValues::Categorical(_) => ColumnKind::Categorical,
            ColumnValues::Datetime(_) => ColumnKind::Datetime,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Categorical(v) => v.len(),
            ColumnValues::Datetime(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn null_count(&self) -> usize {
        match self {
            ColumnValues::Numeric(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnValues::Categorical(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnValues::Datetime(v) => v.iter().filter(|x| x.is_none()).count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Numeric column without nulls.
    pub fn numeric<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        Self::new(
            name,
            ColumnValues::Numeric(values.into_iter().map(Some).collect()),
        )
    }

    /// Categorical column without nulls.
    pub fn categorical<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            ColumnValues::Categorical(values.into_iter().map(|s| Some(s.into())).collect()),
        )
    }

    /// Datetime column without nulls.
    pub fn datetime<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = DateTime<Utc>>,
    {
        Self::new(
            name,
            ColumnValues::Datetime(values.into_iter().map(Some).collect()),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.values.kind()
    }

    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Non-null values projected onto the real line.
    /// Datetimes become epoch seconds (microsecond precision); NaN and
    /// infinities count as missing. Returns `None` for categorical columns.
    pub fn ordinal_values(&self) -> Option<Vec<f64>> {
        match &self.values {
            ColumnValues::Numeric(v) => Some(
                v.iter()
                    .flatten()
                    .copied()
                    .filter(|x| x.is_finite())
                    .collect(),
            ),
            ColumnValues::Datetime(v) => Some(
                v.iter()
                    .flatten()
                    .map(|ts| ts.timestamp_micros() as f64 / 1_000_000.0)
                    .collect(),
            ),
            ColumnValues::Categorical(_) => None,
        }
    }

    /// Non-null values rendered as category labels. Works for every kind.
    pub fn category_labels(&self) -> Vec<String> {
        match &self.values {
            ColumnValues::Categorical(v) => v.iter().flatten().cloned().collect(),
            ColumnValues::Numeric(v) => v.iter().flatten().map(|x| x.to_string()).collect(),
            ColumnValues::Datetime(v) => v.iter().flatten().map(|ts| ts.to_rfc3339()).collect(),
        }
    }

    /// True when at least one cell is non-null.
    pub fn has_values(&self) -> bool {
        self.values.null_count() < self.values.len()
    }

    /// Same name and length, every cell null, typed as `kind`.
    pub fn nulls_of(&self, kind: ColumnKind) -> Self {
        let len = self.len();
        let values = match kind {
            ColumnKind::Numeric => ColumnValues::Numeric(vec![None; len]),
            ColumnKind::Categorical => ColumnValues::Categorical(vec![None; len]),
            ColumnKind::Datetime => ColumnValues::Datetime(vec![None; len]),
        };
        Self::new(self.name.clone(), values)
    }

    /// Re-type the column as categorical, keeping nulls in place.
    pub fn into_categorical(self) -> Self {
        let values = match self.values {
            ColumnValues::Categorical(v) => v,
            ColumnValues::Numeric(v) => v.into_iter().map(|x| x.map(|n| n.to_string())).collect(),
            ColumnValues::Datetime(v) => v
                .into_iter()
                .map(|x| x.map(|ts| ts.to_rfc3339()))
                .collect(),
        };
        Self {
            name: self.name,
            values: ColumnValues::Categorical(values),
        }
    }
}

/// Ordered, named, equal-length columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(DomainError::InvalidDataset(format!(
                    "duplicate column '{}'",
                    column.name()
                )));
            }
        }

        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(DomainError::InvalidDataset(format!(
                    "column '{}' has {} rows, expected {}",
                    bad.name(),
                    bad.len(),
                    expected
                )));
            }
        }

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}
