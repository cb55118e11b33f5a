// driftwatch-core/src/ports/store.rs

use crate::error::DriftwatchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreReceipt {
    pub source: String,
    pub key: String,
    pub size: usize,
}

/// Write-once object storage for rendered reports.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Stores `payload` under `key`. An existing key is never overwritten:
    /// the call fails with `InfrastructureError::StoreUnavailable` instead.
    async fn put(
        &self,
        key: &str,
        payload: &[u8],
        content_type: &str,
    ) -> Result<StoreReceipt, DriftwatchError>;
}
