// driftwatch-core/src/infrastructure/adapters/mod.rs

pub mod duckdb;
pub mod fs_store;
pub mod outbox;
pub mod webhook;

pub use self::duckdb::DuckDbLoader;
pub use fs_store::FsArtifactStore;
pub use outbox::OutboxDispatcher;
pub use webhook::WebhookDispatcher;
