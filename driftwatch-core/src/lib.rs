// driftwatch-core/src/lib.rs

// 1. Documentation
#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports: contracts with the outside world (loader, store, dispatcher)
pub mod ports;

// 2. Domain: datasets, drift statistics, run outcomes, configuration.
// Depends on nothing else in the crate.
pub mod domain;

// 3. Infrastructure: DuckDB, filesystem, outbox/webhook, minijinja, YAML config
pub mod infrastructure;

// 4. Application: the pipeline orchestrator and the report renderer
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use error::DriftwatchError;
