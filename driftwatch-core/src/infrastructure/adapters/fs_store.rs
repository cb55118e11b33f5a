// driftwatch-core/src/infrastructure/adapters/fs_store.rs

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::{info, instrument};

use crate::error::DriftwatchError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::write_new;
use crate::ports::store::{ArtifactStore, StoreReceipt};

/// Artifact store backed by a local directory (one per logical source).
pub struct FsArtifactStore {
    source: String,
    dir: PathBuf,
}

impl FsArtifactStore {
    /// `root/source` holds the objects.
    pub fn new(root: impl AsRef<Path>, source: impl Into<String>) -> Self {
        let source = source.into();
        let dir = root.as_ref().join(&source);
        Self { source, dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    #[instrument(skip(self, payload), fields(source = %self.source, bytes = payload.len()))]
    async fn put(
        &self,
        key: &str,
        payload: &[u8],
        content_type: &str,
    ) -> Result<StoreReceipt, DriftwatchError> {
        let relative = Path::new(key);
        if key.is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            return Err(DriftwatchError::UnsafePath(key.to_string()));
        }

        let target = self.dir.join(relative);
        write_new(&target, payload).map_err(|e| match e {
            InfrastructureError::Io(io) if io.kind() == ErrorKind::AlreadyExists => {
                InfrastructureError::StoreUnavailable(format!(
                    "key '{}' already exists in '{}'",
                    key, self.source
                ))
            }
            InfrastructureError::Io(io) => InfrastructureError::StoreUnavailable(io.to_string()),
            other => other,
        })?;

        info!(key, content_type, "Stored artifact");
        Ok(StoreReceipt {
            source: self.source.clone(),
            key: key.to_string(),
            size: payload.len(),
        })
    }
}
