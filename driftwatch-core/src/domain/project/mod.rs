// driftwatch-core/src/domain/project/mod.rs

pub mod configuration;
pub use configuration::{
    NotificationConfig, PipelineConfig, ProjectConfig, ReportConfig, SourcesConfig,
    StorageConfig, TransportConfig,
};
