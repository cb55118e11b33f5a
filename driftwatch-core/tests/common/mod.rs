// In-memory doubles for the pipeline ports.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use driftwatch_core::domain::project::ProjectConfig;
use driftwatch_core::domain::{Column, Dataset, DatasetLocation};
use driftwatch_core::infrastructure::error::InfrastructureError;
use driftwatch_core::infrastructure::template::JinjaRenderer;
use driftwatch_core::application::DriftPipeline;
use driftwatch_core::ports::{
    ArtifactStore, DatasetLoader, DeliveryReceipt, Notification, NotificationDispatcher,
    StoreReceipt,
};
use driftwatch_core::DriftwatchError;

// ---------------------------------------------------------------------------
// MemoryLoader
// ---------------------------------------------------------------------------

/// Datasets keyed by `source/key`, with a call counter.
#[derive(Default)]
pub struct MemoryLoader {
    datasets: Mutex<HashMap<String, Dataset>>,
    calls: AtomicUsize,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, source: &str, key: &str, dataset: Dataset) -> Self {
        self.datasets
            .lock()
            .unwrap()
            .insert(DatasetLocation::new(source, key).to_string(), dataset);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetLoader for MemoryLoader {
    async fn load(&self, location: &DatasetLocation) -> Result<Dataset, DriftwatchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.datasets
            .lock()
            .unwrap()
            .get(&location.to_string())
            .cloned()
            .ok_or_else(|| InfrastructureError::NotFound(location.to_string()).into())
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Write-once map of key to (content type, payload).
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, (String, Vec<u8>)>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).map(|(_, p)| p.clone())
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn put(
        &self,
        key: &str,
        payload: &[u8],
        content_type: &str,
    ) -> Result<StoreReceipt, DriftwatchError> {
        if self.unavailable {
            return Err(InfrastructureError::StoreUnavailable("bucket offline".into()).into());
        }
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(key) {
            return Err(InfrastructureError::StoreUnavailable(format!("{key} exists")).into());
        }
        objects.insert(key.to_string(), (content_type.to_string(), payload.to_vec()));
        Ok(StoreReceipt {
            source: "reports".into(),
            key: key.to_string(),
            size: payload.len(),
        })
    }
}

// ---------------------------------------------------------------------------
// MemoryDispatcher
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryDispatcher {
    sent: Mutex<Vec<Notification>>,
    failing: bool,
}

impl MemoryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationDispatcher for MemoryDispatcher {
    async fn send(&self, notification: &Notification) -> Result<DeliveryReceipt, DriftwatchError> {
        if self.failing {
            return Err(InfrastructureError::DeliveryError("mail relay refused".into()).into());
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(notification.clone());
        Ok(DeliveryReceipt {
            message_id: format!("msg-{}", sent.len()),
        })
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub const CURRENT: &str = "cur-data";
pub const REFERENCE: &str = "ref-data";

pub fn project_config() -> ProjectConfig {
    let yaml = format!(
        "name: churn\nsources:\n  current: {CURRENT}\n  reference: {REFERENCE}\n  reference_key: ref.csv\nnotification:\n  recipient: ops@example.com\n"
    );
    serde_yaml::from_str(&yaml).unwrap()
}

pub fn ages(values: &[f64]) -> Dataset {
    Dataset::new(vec![Column::numeric("age", values.iter().copied())]).unwrap()
}

pub struct Harness {
    pub loader: Arc<MemoryLoader>,
    pub store: Arc<MemoryStore>,
    pub dispatcher: Arc<MemoryDispatcher>,
    pub pipeline: DriftPipeline,
}

pub fn harness(
    config: ProjectConfig,
    loader: MemoryLoader,
    store: MemoryStore,
    dispatcher: MemoryDispatcher,
) -> Harness {
    let loader = Arc::new(loader);
    let store = Arc::new(store);
    let dispatcher = Arc::new(dispatcher);
    let pipeline = DriftPipeline::new(
        config,
        loader.clone(),
        store.clone(),
        dispatcher.clone(),
        Arc::new(JinjaRenderer::new().unwrap()),
    );
    Harness {
        loader,
        store,
        dispatcher,
        pipeline,
    }
}
