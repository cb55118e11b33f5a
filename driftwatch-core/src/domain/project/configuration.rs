// src/domain/project/configuration.rs

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::domain::drift::DriftConfig;
use crate::domain::error::DomainError;

// Relative segments; a segment never starts with '.', so no `.` or `..`
#[allow(clippy::unwrap_used)]
static KEY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9_\-][A-Za-z0-9_\-.]*/)*([A-Za-z0-9_\-][A-Za-z0-9_\-.]*)?$").unwrap()
});

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ProjectConfig {
    pub name: String,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    #[validate(nested)]
    pub drift: DriftConfig,

    #[serde(default)]
    #[validate(nested)]
    pub report: ReportConfig,

    #[validate(nested)]
    pub notification: NotificationConfig,

    #[serde(default)]
    #[validate(nested)]
    pub pipeline: PipelineConfig,
}

impl ProjectConfig {
    /// Field validation plus the drift test/kind rules.
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()
            .map_err(|e| DomainError::InvalidConfig(e.to_string()))?;
        self.drift.check()
    }
}

/// Logical source (bucket) names.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SourcesConfig {
    /// Source whose uploads trigger a run.
    #[serde(default = "default_current_source")]
    pub current: String,
    #[serde(default = "default_reference_source")]
    pub reference: String,
    #[serde(default = "default_reference_key")]
    pub reference_key: String,
    /// Destination of rendered reports.
    #[serde(default = "default_reports_source")]
    pub reports: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            current: default_current_source(),
            reference: default_reference_source(),
            reference_key: default_reference_key(),
            reports: default_reports_source(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// Directory holding one sub-directory per source.
    #[serde(default = "default_storage_root")]
    pub root: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ReportConfig {
    /// Storage key = `{key_prefix}{artifact id}.html`
    #[serde(default = "default_key_prefix")]
    #[validate(regex(path = *KEY_PREFIX))]
    pub key_prefix: String,

    #[serde(default = "default_attachment_name")]
    #[validate(length(min = 1))]
    pub attachment_name: String,

    #[serde(default = "default_report_title")]
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            attachment_name: default_attachment_name(),
            title: default_report_title(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct NotificationConfig {
    #[validate(email)]
    pub recipient: String,

    #[serde(default = "default_sender")]
    pub sender: String,

    #[serde(default = "default_subject")]
    pub subject: String,

    #[serde(default = "default_body")]
    pub body: String,

    #[serde(default)]
    pub transport: TransportConfig,
}

impl NotificationConfig {
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            sender: default_sender(),
            subject: default_subject(),
            body: default_body(),
            transport: TransportConfig::default(),
        }
    }
}

/// How notifications leave the process.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TransportConfig {
    /// One directory per message, picked up by an external mailer.
    Outbox { path: String },
    /// Multipart POST to an HTTP endpoint.
    Webhook {
        url: String,
        #[serde(default = "default_webhook_timeout")]
        timeout_secs: u64,
    },
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig::Outbox {
            path: "outbox".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct PipelineConfig {
    #[serde(default = "default_max_concurrent_runs")]
    #[validate(range(min = 1, max = 64))]
    pub max_concurrent_runs: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_runs: default_max_concurrent_runs(),
        }
    }
}

fn default_current_source() -> String {
    "current".to_string()
}
fn default_reference_source() -> String {
    "reference".to_string()
}
fn default_reference_key() -> String {
    "ref.csv".to_string()
}
fn default_reports_source() -> String {
    "reports".to_string()
}
fn default_storage_root() -> String {
    "buckets".to_string()
}
fn default_key_prefix() -> String {
    "data_drift_report_".to_string()
}
fn default_attachment_name() -> String {
    "data_quality_report.html".to_string()
}
fn default_report_title() -> String {
    "Data Drift Report".to_string()
}
fn default_sender() -> String {
    "driftwatch@localhost".to_string()
}
fn default_subject() -> String {
    "Data Quality Report has been generated".to_string()
}
fn default_body() -> String {
    "Please find the attached Data Quality Report.".to_string()
}
fn default_webhook_timeout() -> u64 {
    30
}
fn default_max_concurrent_runs() -> usize {
    4
}
