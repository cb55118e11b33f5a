// driftwatch-core/src/domain/run.rs

// States and outcomes of one pipeline run, and the aggregate answer for a
// trigger batch.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::domain::drift::DriftReport;
use crate::domain::trigger::TriggerEvent;

/// Stages of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStage {
    Received,
    Loading,
    Analyzing,
    Rendering,
    Persisting,
    Notifying,
    Completed,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Error taxonomy surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    NotFound,
    ParseError,
    SchemaMismatch,
    StoreUnavailable,
    DeliveryError,
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: RunStage,
    pub kind: FailureKind,
    pub reason: String,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed ({}): {}", self.stage, self.kind, self.reason)
    }
}

/// What reached durable storage during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedReport {
    pub report_id: Uuid,
    pub artifact_id: Uuid,
    pub report_key: String,
    pub overall_drifted: bool,
    pub drifted_columns: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Event for a source we do not watch. Nothing was loaded.
    Skipped { event: TriggerEvent, reason: String },
    Completed {
        event: TriggerEvent,
        report: PublishedReport,
        delivery_id: String,
    },
    /// Stored, but the notification could not be delivered.
    Degraded {
        event: TriggerEvent,
        report: PublishedReport,
        delivery_error: StageFailure,
    },
    Failed {
        event: TriggerEvent,
        failure: StageFailure,
        /// Kept when the analysis finished but persisting did not.
        #[serde(skip_serializing_if = "Option::is_none")]
        retained_report: Option<Box<DriftReport>>,
    },
}

impl RunOutcome {
    pub fn event(&self) -> &TriggerEvent {
        match self {
            RunOutcome::Skipped { event, .. }
            | RunOutcome::Completed { event, .. }
            | RunOutcome::Degraded { event, .. }
            | RunOutcome::Failed { event, .. } => event,
        }
    }

    /// Key of the stored artifact, when one exists.
    pub fn report_key(&self) -> Option<&str> {
        match self {
            RunOutcome::Completed { report, .. } | RunOutcome::Degraded { report, .. } => {
                Some(&report.report_key)
            }
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RunOutcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, RunOutcome::Skipped { .. })
    }

    /// Terminal state of the state machine, or the failed stage.
    pub fn final_stage(&self) -> RunStage {
        match self {
            RunOutcome::Skipped { .. } => RunStage::Received,
            RunOutcome::Completed { .. } | RunOutcome::Degraded { .. } => RunStage::Completed,
            RunOutcome::Failed { failure, .. } => failure.stage,
        }
    }
}

/// Synchronous answer for a whole trigger batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub status_code: u16,
    pub message: String,
    pub report_keys: Vec<String>,
    pub runs: Vec<RunOutcome>,
}

impl BatchResult {
    pub fn from_runs(runs: Vec<RunOutcome>) -> Self {
        let failed = runs.iter().filter(|r| r.is_failure()).count();
        let degraded = runs
            .iter()
            .filter(|r| matches!(r, RunOutcome::Degraded { .. }))
            .count();
        let report_keys: Vec<String> = runs
            .iter()
            .filter_map(|r| r.report_key().map(str::to_string))
            .collect();
        let processed = runs.iter().filter(|r| !r.is_skipped()).count();

        let status_code = match (processed, failed) {
            (_, 0) => 200,
            (p, f) if f == p => 500,
            _ => 207,
        };

        let message = if processed == 0 {
            "No files processed from the watched source.".to_string()
        } else if failed == 0 && degraded == 0 {
            format!("{} report(s) generated, stored and delivered.", report_keys.len())
        } else {
            format!(
                "{} report(s) stored, {} delivery failure(s), {} failed run(s).",
                report_keys.len(),
                degraded,
                failed
            )
        };

        Self {
            status_code,
            message,
            report_keys,
            runs,
        }
    }

    /// First stored key, mirroring the single-report response shape.
    pub fn report_key(&self) -> Option<&str> {
        self.report_keys.first().map(String::as_str)
    }
}
