// driftwatch/src/commands/run.rs
//
// USE CASE: Process a trigger batch through the drift pipeline.
// stdout carries the batch result (JSON); progress goes to stderr.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use tracing::info;
use driftwatch_core::application::DriftPipeline;
use driftwatch_core::domain::project::{ProjectConfig, TransportConfig};
use driftwatch_core::domain::{DatasetLocation, TriggerBatch};
use driftwatch_core::infrastructure::adapters::{
    DuckDbLoader, FsArtifactStore, OutboxDispatcher, WebhookDispatcher,
};
use driftwatch_core::infrastructure::config::load_project_config;
use driftwatch_core::infrastructure::template::JinjaRenderer;
use driftwatch_core::ports::NotificationDispatcher;

pub async fn execute(
    project_dir: PathBuf,
    events: Option<PathBuf>,
    source: Option<String>,
    key: Option<String>,
) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    eprintln!("⚙️  Loading configuration...");
    let config = load_project_config(&project_dir).with_context(|| {
        format!(
            "Failed to load project configuration from {:?}",
            project_dir
        )
    })?;
    eprintln!("   Project: {}", config.name);
    eprintln!(
        "   Watching: '{}' (reference '{}/{}')",
        config.sources.current, config.sources.reference, config.sources.reference_key
    );

    let batch = read_batch(events.as_deref(), source, key)?;
    eprintln!("📥 {} trigger event(s) received", batch.len());
    info!(project = %config.name, events = batch.len(), "Dispatching trigger batch");

    let pipeline = build_pipeline(config)?;
    let result = pipeline.run_batch(&batch).await;

    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.status_code >= 500 {
        eprintln!("\n❌ FAILURE. {}", result.message);
        std::process::exit(1);
    }
    eprintln!("\n✨ {} ({:.2?})", result.message, start.elapsed());
    Ok(())
}

fn read_batch(
    events: Option<&Path>,
    source: Option<String>,
    key: Option<String>,
) -> anyhow::Result<TriggerBatch> {
    match (events, source, key) {
        (Some(path), _, _) => {
            let raw = if path == Path::new("-") {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("Failed to read trigger batch from stdin")?;
                buf
            } else {
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read trigger batch {:?}", path))?
            };
            serde_json::from_str(&raw).context("Trigger batch is neither a storage notification nor an event list")
        }
        (None, Some(source), Some(key)) => {
            Ok(TriggerBatch::single(DatasetLocation::new(source, key)))
        }
        _ => bail!("Provide --events FILE or both --source and --key"),
    }
}

fn build_pipeline(config: ProjectConfig) -> anyhow::Result<DriftPipeline> {
    let loader = Arc::new(DuckDbLoader::new(&config.storage.root));
    let store = Arc::new(FsArtifactStore::new(
        &config.storage.root,
        &config.sources.reports,
    ));

    let dispatcher: Arc<dyn NotificationDispatcher> = match &config.notification.transport {
        TransportConfig::Outbox { path } => {
            eprintln!("   Delivery: outbox {}", path);
            Arc::new(OutboxDispatcher::new(path))
        }
        TransportConfig::Webhook { url, timeout_secs } => {
            eprintln!("   Delivery: webhook {}", url);
            Arc::new(
                WebhookDispatcher::new(url, Duration::from_secs(*timeout_secs))
                    .with_context(|| format!("Failed to set up webhook delivery to {}", url))?,
            )
        }
    };

    let engine = Arc::new(JinjaRenderer::new().context("Failed to load report templates")?);
    Ok(DriftPipeline::new(config, loader, store, dispatcher, engine))
}
