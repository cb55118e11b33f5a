// driftwatch-core/src/ports/notifier.rs

use crate::error::DriftwatchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    #[serde(skip)]
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Report the attachment was rendered from, and where it is stored.
    pub report_id: Uuid,
    pub report_key: String,
    pub sender: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attachment: Attachment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub message_id: String,
}

/// Delivers one notification with its attachment. Failures surface as
/// `InfrastructureError::DeliveryError`.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<DeliveryReceipt, DriftwatchError>;
}
