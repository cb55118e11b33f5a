// driftwatch-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DatabaseError {
    #[error("DuckDB Engine Error: {0}")]
    #[diagnostic(
        code(driftwatch::infra::database::duckdb),
        help("An error occurred inside the SQL engine while reading the dataset.")
    )]
    DuckDB(#[from] duckdb::Error),
}

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- DATASETS ---
    #[error("Dataset not found: {0}")]
    #[diagnostic(
        code(driftwatch::infra::not_found),
        help("Check the source name and object key of the trigger.")
    )]
    NotFound(String),

    #[error("Could not parse dataset '{location}': {reason}")]
    #[diagnostic(code(driftwatch::infra::parse))]
    ParseError { location: String, reason: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DatabaseError),

    // --- ARTIFACT STORE ---
    #[error("Artifact store unavailable: {0}")]
    #[diagnostic(
        code(driftwatch::infra::store),
        help("Re-deliver the trigger: a new run writes under a new key.")
    )]
    StoreUnavailable(String),

    // --- NOTIFICATIONS ---
    #[error("Notification delivery failed: {0}")]
    #[diagnostic(code(driftwatch::infra::delivery))]
    DeliveryError(String),

    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(driftwatch::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / SERIALIZATION ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(driftwatch::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON Error: {0}")]
    #[diagnostic(code(driftwatch::infra::json))]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(driftwatch::infra::config))]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(driftwatch::infra::config_missing))]
    ConfigNotFound(String),

    // --- TEMPLATING ---
    #[error("Template Rendering Error: {0}")]
    #[diagnostic(
        code(driftwatch::infra::template),
        help("The embedded report template failed to render.")
    )]
    TemplateError(#[from] minijinja::Error),
}

impl From<duckdb::Error> for InfrastructureError {
    fn from(err: duckdb::Error) -> Self {
        InfrastructureError::Database(DatabaseError::DuckDB(err))
    }
}
