// driftwatch-core/src/domain/drift/report.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::dataset::ColumnKind;
use crate::domain::drift::config::StatTest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftStatus {
    Drifted,
    Stable,
    /// One side had no usable values. Counted as not drifted.
    Undetermined,
}

/// Outcome of the drift test for a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDriftResult {
    pub column: String,
    pub kind: ColumnKind,
    pub test: StatTest,
    pub statistic: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
    pub threshold: f64,
    pub drifted: bool,
    pub status: DriftStatus,
    pub reference_count: usize,
    pub current_count: usize,
}

impl ColumnDriftResult {
    /// The number the threshold was applied to.
    pub fn score(&self) -> f64 {
        self.p_value.unwrap_or(self.statistic)
    }
}

/// Aggregate verdict over every analyzed column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub columns: Vec<ColumnDriftResult>,
    pub drifted_count: usize,
    pub drift_share: f64,
    pub share_threshold: f64,
    pub overall_drifted: bool,
    pub reference_rows: usize,
    pub current_rows: usize,
}

impl DriftReport {
    /// Build a report, deriving the counters and verdict from the columns.
    pub fn from_columns(
        columns: Vec<ColumnDriftResult>,
        share_threshold: f64,
        reference_rows: usize,
        current_rows: usize,
    ) -> Self {
        let drifted_count = columns.iter().filter(|c| c.drifted).count();
        let drift_share = if columns.is_empty() {
            0.0
        } else {
            drifted_count as f64 / columns.len() as f64
        };

        Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            columns,
            drifted_count,
            drift_share,
            share_threshold,
            overall_drifted: drift_share > share_threshold,
            reference_rows,
            current_rows,
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDriftResult> {
        self.columns.iter().find(|c| c.column == name)
    }

    pub fn undetermined_count(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.status == DriftStatus::Undetermined)
            .count()
    }

    /// True when both reports carry the same findings, ignoring run metadata
    /// (identifier and timestamp).
    pub fn same_findings(&self, other: &DriftReport) -> bool {
        self.columns == other.columns
            && self.drifted_count == other.drifted_count
            && self.drift_share == other.drift_share
            && self.share_threshold == other.share_threshold
            && self.overall_drifted == other.overall_drifted
            && self.reference_rows == other.reference_rows
            && self.current_rows == other.current_rows
    }

    pub fn verdict_label(&self) -> &'static str {
        if self.overall_drifted {
            "Drift detected"
        } else {
            "No drift detected"
        }
    }
}
