// driftwatch-core/src/ports/mod.rs

// Contracts the pipeline depends on. Adapters live in `infrastructure`,
// in-memory doubles live in the tests.

pub mod loader;
pub mod notifier;
pub mod store;

pub use loader::DatasetLoader;
pub use notifier::{Attachment, DeliveryReceipt, Notification, NotificationDispatcher};
pub use store::{ArtifactStore, StoreReceipt};
