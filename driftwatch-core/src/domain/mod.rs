pub mod dataset;
pub mod drift;
pub mod error;
pub mod project;
pub mod run;
pub mod trigger;

// Raccourcis pour les types du domaine les plus utilisés
pub use dataset::{Column, ColumnKind, ColumnValues, Dataset};
pub use error::DomainError;
pub use trigger::{DatasetLocation, TriggerBatch, TriggerEvent};
