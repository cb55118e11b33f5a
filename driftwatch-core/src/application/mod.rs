// driftwatch-core/src/application/mod.rs

pub mod analyze;
pub mod pipeline;
pub mod ports;
pub mod render;

// --- RE-EXPORTS (FACADE PATTERN) ---
// `use driftwatch_core::application::{DriftPipeline, analyze_files};`
pub use analyze::analyze_files;
pub use pipeline::DriftPipeline;
pub use render::{ReportArtifact, ReportRenderer};
