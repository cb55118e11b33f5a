// Pipeline wired to the filesystem adapters: DuckDB loader, local store, outbox.

#![allow(clippy::unwrap_used)]

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

use driftwatch_core::application::DriftPipeline;
use driftwatch_core::domain::project::TransportConfig;
use driftwatch_core::domain::drift::DriftStatus;
use driftwatch_core::domain::run::RunOutcome;
use driftwatch_core::domain::TriggerBatch;
use driftwatch_core::infrastructure::adapters::{DuckDbLoader, FsArtifactStore, OutboxDispatcher};
use driftwatch_core::infrastructure::adapters::outbox::ENVELOPE_FILE;
use driftwatch_core::infrastructure::config::load_project_config_with;
use driftwatch_core::infrastructure::template::JinjaRenderer;

fn write(root: &Path, rel: &str, content: &str) -> Result<()> {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap())?;
    fs::write(path, content)?;
    Ok(())
}

fn write_project(root: &Path) -> Result<()> {
    write(
        root,
        "driftwatch.yaml",
        "name: churn\nsources:\n  current: cur-data\n  reference: ref-data\nnotification:\n  recipient: ops@example.com\n",
    )?;
    write(root, "buckets/ref-data/ref.csv", "age,plan\n20,basic\n21,pro\n22,basic\n23,pro\n")
}

fn local_pipeline(root: &Path) -> Result<(DriftPipeline, String)> {
    let config = load_project_config_with(root, |_| None)?;
    let TransportConfig::Outbox { path: outbox_dir } = config.notification.transport.clone() else {
        panic!("default transport is the outbox");
    };
    let pipeline = DriftPipeline::new(
        config.clone(),
        Arc::new(DuckDbLoader::new(&config.storage.root)),
        Arc::new(FsArtifactStore::new(&config.storage.root, &config.sources.reports)),
        Arc::new(OutboxDispatcher::new(&outbox_dir)),
        Arc::new(JinjaRenderer::new()?),
    );
    Ok((pipeline, outbox_dir))
}

#[tokio::test]
async fn storage_notification_end_to_end() -> Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    write_project(root)?;
    write(root, "buckets/cur-data/2024/05/batch.csv", "age,plan\n80,basic\n81,pro\n82,basic\n83,pro\n")?;

    let (pipeline, outbox_dir) = local_pipeline(root)?;

    let batch: TriggerBatch = serde_json::from_str(
        r#"{"Records": [{"s3": {"bucket": {"name": "cur-data"}, "object": {"key": "2024/05/batch.csv"}}}]}"#,
    )?;
    let result = pipeline.run_batch(&batch).await;

    assert_eq!(result.status_code, 200, "{:?}", result.runs);
    let key = result.report_key().unwrap();
    let stored = root.join("buckets/reports").join(key);
    assert!(stored.is_file());

    let RunOutcome::Completed { delivery_id, report, .. } = &result.runs[0] else {
        panic!("expected completed run");
    };
    assert!(report.overall_drifted);
    let message_dir = Path::new(&outbox_dir).join(delivery_id);
    assert!(message_dir.join(ENVELOPE_FILE).is_file());
    assert_eq!(
        fs::read(message_dir.join("data_quality_report.html"))?,
        fs::read(&stored)?
    );
    Ok(())
}

#[tokio::test]
async fn header_only_and_all_null_batches_complete_undetermined() -> Result<()> {
    let dir = tempdir()?;
    let root = dir.path();
    write_project(root)?;
    write(root, "buckets/cur-data/empty.csv", "age,plan\n")?;
    write(root, "buckets/cur-data/nulls.csv", "age,plan\n,basic\n,pro\n")?;

    let (pipeline, _) = local_pipeline(root)?;
    let batch: TriggerBatch = serde_json::from_str(
        r#"{"events": [{"source": "cur-data", "key": "empty.csv"}, {"source": "cur-data", "key": "nulls.csv"}]}"#,
    )?;
    let result = pipeline.run_batch(&batch).await;

    assert_eq!(result.status_code, 200, "{:?}", result.runs);
    for run in &result.runs {
        let RunOutcome::Completed { report, .. } = run else {
            panic!("expected completed run, got {:?}", run);
        };
        let age = report.column("age").unwrap();
        assert_eq!(age.status, DriftStatus::Undetermined);
        assert!(!age.drifted);
    }
    Ok(())
}
