// driftwatch-core/src/application/analyze.rs

// Ad-hoc comparison of two local files, outside the trigger flow.

use std::path::Path;
use tracing::{info, instrument};

use crate::domain::drift::{analyze, DriftConfig, DriftReport};
use crate::error::DriftwatchError;
use crate::infrastructure::adapters::DuckDbLoader;

#[instrument(skip(config))]
pub fn analyze_files(
    reference: &Path,
    current: &Path,
    config: &DriftConfig,
) -> Result<DriftReport, DriftwatchError> {
    let reference = DuckDbLoader::load_path(reference)?;
    let current = DuckDbLoader::load_path(current)?;

    let report = analyze(&reference, &current, config)?;
    info!(
        drifted = report.drifted_count,
        columns = report.columns.len(),
        "Analysis finished"
    );
    Ok(report)
}
