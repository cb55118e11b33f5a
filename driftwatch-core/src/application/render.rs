// driftwatch-core/src/application/render.rs

use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::application::ports::TemplateEngine;
use crate::domain::drift::DriftReport;
use crate::domain::project::ReportConfig;
use crate::error::DriftwatchError;
use crate::infrastructure::template::REPORT_TEMPLATE;

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Rendered, immutable form of a [`DriftReport`].
///
/// `report_id` ties the artifact to its report. The storage key is derived from
/// `id`, minted per render, so two renders of one report never share a key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportArtifact {
    pub id: Uuid,
    pub report_id: Uuid,
    pub key: String,
    pub content_type: String,
    #[serde(skip)]
    pub payload: Vec<u8>,
}

impl ReportArtifact {
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}

/// Turns reports into self-contained HTML documents. Pure: nothing is stored.
#[derive(Clone)]
pub struct ReportRenderer {
    engine: Arc<dyn TemplateEngine>,
    config: ReportConfig,
}

impl ReportRenderer {
    pub fn new(engine: Arc<dyn TemplateEngine>, config: ReportConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Every call mints a new artifact id, hence a new storage key.
    pub fn render(&self, report: &DriftReport) -> Result<ReportArtifact, DriftwatchError> {
        let id = Uuid::new_v4();
        let context = json!({
            "title": self.config.title,
            "artifact_id": id,
            "verdict": report.verdict_label(),
            "undetermined": report.undetermined_count(),
            "report": report,
        });

        let html = self.engine.render(REPORT_TEMPLATE, &context)?;
        let key = artifact_key(&self.config.key_prefix, &id);
        debug!(key = %key, bytes = html.len(), "Report rendered");

        Ok(ReportArtifact {
            id,
            report_id: report.id,
            key,
            content_type: HTML_CONTENT_TYPE.to_string(),
            payload: html.into_bytes(),
        })
    }
}

/// `{prefix}{32 lowercase hex}.html`
pub fn artifact_key(prefix: &str, id: &Uuid) -> String {
    format!("{}{}.html", prefix, id.simple())
}
