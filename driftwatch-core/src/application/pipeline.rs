// driftwatch-core/src/application/pipeline.rs

// Per-event state machine:
// Received -> Loading -> Analyzing -> Rendering -> Persisting -> Notifying -> Completed
// Any stage before Notifying can end the run as Failed. A failed notification
// still leaves a stored report and ends as Degraded.

use futures::StreamExt;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::application::ports::TemplateEngine;
use crate::application::render::ReportRenderer;
use crate::domain::drift::{analyze, DriftReport};
use crate::domain::project::ProjectConfig;
use crate::domain::run::{
    BatchResult, FailureKind, PublishedReport, RunOutcome, RunStage, StageFailure,
};
use crate::domain::trigger::{DatasetLocation, TriggerBatch, TriggerEvent};
use crate::error::DriftwatchError;
use crate::ports::{Attachment, ArtifactStore, DatasetLoader, Notification, NotificationDispatcher};

/// Ports are shared, immutable, and constructed by the caller.
pub struct DriftPipeline {
    config: Arc<ProjectConfig>,
    loader: Arc<dyn DatasetLoader>,
    store: Arc<dyn ArtifactStore>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    renderer: ReportRenderer,
}

impl DriftPipeline {
    pub fn new(
        config: ProjectConfig,
        loader: Arc<dyn DatasetLoader>,
        store: Arc<dyn ArtifactStore>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        engine: Arc<dyn TemplateEngine>,
    ) -> Self {
        let renderer = ReportRenderer::new(engine, config.report.clone());
        Self {
            config: Arc::new(config),
            loader,
            store,
            dispatcher,
            renderer,
        }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Only uploads to the current-data source start a run.
    pub fn watches(&self, event: &TriggerEvent) -> bool {
        event.source == self.config.sources.current
    }

    fn reference_location(&self) -> DatasetLocation {
        DatasetLocation::new(
            &self.config.sources.reference,
            &self.config.sources.reference_key,
        )
    }

    /// Processes every event of the batch. Runs are independent and execute
    /// with bounded concurrency; outcomes keep the batch order.
    #[instrument(skip_all, fields(events = batch.len()))]
    pub async fn run_batch(&self, batch: &TriggerBatch) -> BatchResult {
        let limit = self.config.pipeline.max_concurrent_runs.max(1);

        let runs: Vec<RunOutcome> = futures::stream::iter(batch.events.iter())
            .map(|event| self.process_event(event))
            .buffered(limit)
            .collect()
            .await;

        let result = BatchResult::from_runs(runs);
        info!(status = result.status_code, "{}", result.message);
        result
    }

    #[instrument(skip_all, fields(source = %event.source, key = %event.key))]
    pub async fn process_event(&self, event: &TriggerEvent) -> RunOutcome {
        if !self.watches(event) {
            warn!(
                watched = %self.config.sources.current,
                "Ignoring event from unwatched source"
            );
            return RunOutcome::Skipped {
                event: event.clone(),
                reason: format!(
                    "source '{}' is not the watched source '{}'",
                    event.source, self.config.sources.current
                ),
            };
        }
        info!(stage = %RunStage::Received, "Run started");

        // --- Loading ---
        info!(stage = %RunStage::Loading, "Loading reference and current datasets");
        let reference = match self.loader.load(&self.reference_location()).await {
            Ok(ds) => ds,
            Err(e) => return failed(event, RunStage::Loading, e.failure_kind(), &e, None),
        };
        let current = match self.loader.load(event).await {
            Ok(ds) => ds,
            Err(e) => return failed(event, RunStage::Loading, e.failure_kind(), &e, None),
        };

        // --- Analyzing ---
        info!(
            stage = %RunStage::Analyzing,
            reference_rows = reference.row_count(),
            current_rows = current.row_count(),
            "Comparing distributions"
        );
        let report = match analyze(&reference, &current, &self.config.drift) {
            Ok(report) => report,
            Err(e) => {
                let e = DriftwatchError::from(e);
                return failed(event, RunStage::Analyzing, e.failure_kind(), &e, None);
            }
        };

        // --- Rendering ---
        info!(stage = %RunStage::Rendering, report_id = %report.id, "Rendering report");
        let artifact = match self.renderer.render(&report) {
            Ok(artifact) => artifact,
            Err(e) => {
                return failed(event, RunStage::Rendering, FailureKind::Internal, &e, Some(report));
            }
        };

        // --- Persisting ---
        info!(stage = %RunStage::Persisting, report_key = %artifact.key, "Storing report");
        if let Err(e) = self
            .store
            .put(&artifact.key, &artifact.payload, &artifact.content_type)
            .await
        {
            return failed(
                event,
                RunStage::Persisting,
                FailureKind::StoreUnavailable,
                &e,
                Some(report),
            );
        }

        let published = PublishedReport {
            report_id: report.id,
            artifact_id: artifact.id,
            report_key: artifact.key.clone(),
            overall_drifted: report.overall_drifted,
            drifted_columns: report.drifted_count,
        };

        // --- Notifying ---
        info!(stage = %RunStage::Notifying, recipient = %self.config.notification.recipient, "Sending report");
        let notification = self.notification(&published, artifact.content_type, artifact.payload);
        match self.dispatcher.send(&notification).await {
            Ok(receipt) => {
                info!(
                    stage = %RunStage::Completed,
                    report_key = %published.report_key,
                    drifted = published.overall_drifted,
                    "Run completed"
                );
                RunOutcome::Completed {
                    event: event.clone(),
                    report: published,
                    delivery_id: receipt.message_id,
                }
            }
            Err(e) => {
                warn!(
                    report_key = %published.report_key,
                    error = %e,
                    "Report stored but notification failed"
                );
                RunOutcome::Degraded {
                    event: event.clone(),
                    report: published,
                    delivery_error: StageFailure {
                        stage: RunStage::Notifying,
                        kind: FailureKind::DeliveryError,
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    fn notification(
        &self,
        published: &PublishedReport,
        content_type: String,
        content: Vec<u8>,
    ) -> Notification {
        let settings = &self.config.notification;
        Notification {
            report_id: published.report_id,
            report_key: published.report_key.clone(),
            sender: settings.sender.clone(),
            recipient: settings.recipient.clone(),
            subject: settings.subject.clone(),
            body: settings.body.clone(),
            attachment: Attachment {
                filename: self.config.report.attachment_name.clone(),
                content_type,
                content,
            },
        }
    }
}

fn failed(
    event: &TriggerEvent,
    stage: RunStage,
    kind: FailureKind,
    err: &DriftwatchError,
    retained: Option<DriftReport>,
) -> RunOutcome {
    error!(stage = %stage, kind = %kind, error = %err, "Run failed");
    RunOutcome::Failed {
        event: event.clone(),
        failure: StageFailure {
            stage,
            kind,
            reason: err.to_string(),
        },
        retained_report: retained.map(Box::new),
    }
}
