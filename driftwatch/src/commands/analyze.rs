// driftwatch/src/commands/analyze.rs
//
// USE CASE: Ad-hoc drift analysis of two local files.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use comfy_table::{Cell, Color, Table};
use driftwatch_core::application::{ReportRenderer, analyze_files};
use driftwatch_core::domain::drift::{DriftConfig, DriftReport, DriftStatus};
use driftwatch_core::domain::project::ReportConfig;
use driftwatch_core::infrastructure::config::load_project_config;
use driftwatch_core::infrastructure::fs::atomic_write;
use driftwatch_core::infrastructure::template::JinjaRenderer;

use crate::cli::OutputFormat;

/// Exit code when `--fail-on-drift` is set and drift was found.
pub const DRIFT_EXIT_CODE: i32 = 2;

pub fn execute(
    reference: PathBuf,
    current: PathBuf,
    project_dir: Option<PathBuf>,
    format: OutputFormat,
    output: Option<PathBuf>,
    fail_on_drift: bool,
) -> anyhow::Result<()> {
    let (drift, report_config) = match &project_dir {
        Some(dir) => {
            let config = load_project_config(dir).with_context(|| {
                format!("Failed to load project configuration from {:?}", dir)
            })?;
            (config.drift, config.report)
        }
        None => (DriftConfig::default(), ReportConfig::default()),
    };

    let report = analyze_files(&reference, &current, &drift).with_context(|| {
        format!(
            "Failed to compare {} against {}",
            current.display(),
            reference.display()
        )
    })?;

    let rendered = match format {
        OutputFormat::Table => render_table(&report),
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Html => {
            let engine = Arc::new(JinjaRenderer::new()?);
            let artifact = ReportRenderer::new(engine, report_config).render(&report)?;
            String::from_utf8(artifact.payload)?
        }
    };

    match output {
        Some(path) => {
            atomic_write(&path, rendered.as_bytes())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("📝 Report written to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    if fail_on_drift && report.overall_drifted {
        std::process::exit(DRIFT_EXIT_CODE);
    }
    Ok(())
}

fn render_table(report: &DriftReport) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "Column", "Type", "Test", "Statistic", "p-value", "Threshold", "Status",
    ]);

    for col in &report.columns {
        let status = match col.status {
            DriftStatus::Drifted => Cell::new("DRIFTED").fg(Color::Red),
            DriftStatus::Stable => Cell::new("stable").fg(Color::Green),
            DriftStatus::Undetermined => Cell::new("undetermined").fg(Color::Yellow),
        };
        table.add_row(vec![
            Cell::new(&col.column),
            Cell::new(col.kind),
            Cell::new(col.test),
            Cell::new(format!("{:.4}", col.statistic)),
            Cell::new(col.p_value.map(|p| format!("{:.4}", p)).unwrap_or_else(|| "-".into())),
            Cell::new(col.threshold),
            status,
        ]);
    }

    format!(
        "{table}\n{}: {} of {} column(s) drifted (share {:.2}, threshold {:.2})",
        report.verdict_label(),
        report.drifted_count,
        report.columns.len(),
        report.drift_share,
        report.share_threshold
    )
}
