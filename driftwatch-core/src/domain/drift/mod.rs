// driftwatch-core/src/domain/drift/mod.rs

pub mod analyzer;
pub mod config;
pub mod report;
pub mod stats;

pub use analyzer::analyze;
pub use config::{DriftConfig, Measure, StatTest, TestConfig};
pub use report::{ColumnDriftResult, DriftReport, DriftStatus};
