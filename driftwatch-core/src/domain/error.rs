// driftwatch-core/src/domain/error.rs

use miette::Diagnostic;
use std::fmt;
use thiserror::Error;

use crate::domain::dataset::ColumnKind;

/// Why a column prevents two datasets from being compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnConflict {
    MissingInCurrent(String),
    MissingInReference(String),
    KindMismatch {
        column: String,
        reference: ColumnKind,
        current: ColumnKind,
    },
}

impl ColumnConflict {
    pub fn column(&self) -> &str {
        match self {
            ColumnConflict::MissingInCurrent(name) | ColumnConflict::MissingInReference(name) => {
                name
            }
            ColumnConflict::KindMismatch { column, .. } => column,
        }
    }
}

impl fmt::Display for ColumnConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnConflict::MissingInCurrent(name) => {
                write!(f, "'{}' is missing from the current dataset", name)
            }
            ColumnConflict::MissingInReference(name) => {
                write!(f, "'{}' is missing from the reference dataset", name)
            }
            ColumnConflict::KindMismatch {
                column,
                reference,
                current,
            } => write!(
                f,
                "'{}' is {} in the reference but {} in the current dataset",
                column, reference, current
            ),
        }
    }
}

fn describe_conflicts(conflicts: &[ColumnConflict]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Schema mismatch between reference and current datasets: {}", describe_conflicts(.conflicts))]
    #[diagnostic(
        code(driftwatch::domain::schema_mismatch),
        help("Both datasets must expose the same columns with the same kinds. Use 'ignore_columns' or 'categorical_columns' to reconcile them explicitly.")
    )]
    SchemaMismatch { conflicts: Vec<ColumnConflict> },

    #[error("Invalid dataset: {0}")]
    #[diagnostic(code(driftwatch::domain::dataset))]
    InvalidDataset(String),

    #[error("Invalid drift configuration: {0}")]
    #[diagnostic(
        code(driftwatch::domain::config),
        help("Check the 'drift' section of driftwatch.yaml.")
    )]
    InvalidConfig(String),
}

impl DomainError {
    /// Names of the columns behind a schema mismatch, in report order.
    pub fn offending_columns(&self) -> Vec<&str> {
        match self {
            DomainError::SchemaMismatch { conflicts } => {
                conflicts.iter().map(ColumnConflict::column).collect()
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_lists_every_column() {
        let err = DomainError::SchemaMismatch {
            conflicts: vec![
                ColumnConflict::MissingInCurrent("age".into()),
                ColumnConflict::KindMismatch {
                    column: "city".into(),
                    reference: ColumnKind::Categorical,
                    current: ColumnKind::Numeric,
                },
            ],
        };

        let msg = err.to_string();
        assert!(msg.contains("'age' is missing from the current dataset"));
        assert!(msg.contains("'city' is categorical in the reference but numeric"));
        assert_eq!(err.offending_columns(), vec!["age", "city"]);
    }
}
