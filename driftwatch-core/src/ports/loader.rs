// driftwatch-core/src/ports/loader.rs

use crate::domain::dataset::Dataset;
use crate::domain::trigger::DatasetLocation;
use crate::error::DriftwatchError;
use async_trait::async_trait;

/// Turns a stored tabular object into a typed [`Dataset`].
///
/// Implementations must fail with `InfrastructureError::NotFound` when the
/// object does not exist and `InfrastructureError::ParseError` when it is not
/// readable as a table.
#[async_trait]
pub trait DatasetLoader: Send + Sync {
    async fn load(&self, location: &DatasetLocation) -> Result<Dataset, DriftwatchError>;
}
