// driftwatch-core/src/error.rs

use crate::domain::error::DomainError;
use crate::domain::run::FailureKind;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriftwatchError {
    // --- DOMAIN (schema, dataset, config rules) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE (IO, DuckDB, store, delivery) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- GENERIC ---
    #[error("Internal Error: {0}")]
    InternalError(String),

    #[error("Unsafe path traversal detected: {0}")]
    UnsafePath(String),
}

impl From<std::io::Error> for DriftwatchError {
    fn from(err: std::io::Error) -> Self {
        DriftwatchError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl DriftwatchError {
    /// Place the error in the taxonomy reported to callers.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            DriftwatchError::Domain(DomainError::SchemaMismatch { .. }) => {
                FailureKind::SchemaMismatch
            }
            DriftwatchError::Domain(DomainError::InvalidDataset(_)) => FailureKind::ParseError,
            DriftwatchError::Domain(DomainError::InvalidConfig(_)) => FailureKind::Internal,
            DriftwatchError::Infrastructure(infra) => match infra {
                InfrastructureError::NotFound(_) => FailureKind::NotFound,
                InfrastructureError::ParseError { .. } | InfrastructureError::Database(_) => {
                    FailureKind::ParseError
                }
                InfrastructureError::StoreUnavailable(_) => FailureKind::StoreUnavailable,
                InfrastructureError::DeliveryError(_) => FailureKind::DeliveryError,
                _ => FailureKind::Internal,
            },
            DriftwatchError::UnsafePath(_) => FailureKind::NotFound,
            DriftwatchError::InternalError(_) => FailureKind::Internal,
        }
    }
}
