// driftwatch-core/src/infrastructure/adapters/outbox.rs

// Spool-directory delivery: each message becomes `<outbox>/<message id>/`
// holding the attachment and a `message.json` envelope written last. An external
// mailer only picks up directories whose envelope exists.

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::DriftwatchError;
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::{atomic_write, write_new};
use crate::ports::notifier::{DeliveryReceipt, Notification, NotificationDispatcher};

pub const ENVELOPE_FILE: &str = "message.json";

#[derive(Serialize)]
struct Envelope<'a> {
    message_id: &'a str,
    report_id: String,
    report_key: &'a str,
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
    attachment: &'a str,
    content_type: &'a str,
}

pub struct OutboxDispatcher {
    dir: PathBuf,
}

impl OutboxDispatcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn spool(&self, message_id: &str, notification: &Notification) -> Result<(), InfrastructureError> {
        let attachment = &notification.attachment;
        let filename = Path::new(&attachment.filename);
        let plain = filename.components().count() == 1
            && matches!(filename.components().next(), Some(Component::Normal(_)));
        if !plain || attachment.filename == ENVELOPE_FILE {
            return Err(InfrastructureError::DeliveryError(format!(
                "invalid attachment name '{}'",
                attachment.filename
            )));
        }

        let message_dir = self.dir.join(message_id);
        write_new(message_dir.join(filename), &attachment.content)?;

        let envelope = Envelope {
            message_id,
            report_id: notification.report_id.simple().to_string(),
            report_key: &notification.report_key,
            from: &notification.sender,
            to: &notification.recipient,
            subject: &notification.subject,
            body: &notification.body,
            attachment: &attachment.filename,
            content_type: &attachment.content_type,
        };
        atomic_write(message_dir.join(ENVELOPE_FILE), serde_json::to_vec_pretty(&envelope)?)?;
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcher for OutboxDispatcher {
    #[instrument(skip_all, fields(to = %notification.recipient))]
    async fn send(&self, notification: &Notification) -> Result<DeliveryReceipt, DriftwatchError> {
        let message_id = Uuid::new_v4().simple().to_string();

        self.spool(&message_id, notification).map_err(|e| match e {
            InfrastructureError::DeliveryError(_) => e,
            other => InfrastructureError::DeliveryError(other.to_string()),
        })?;

        info!(message_id = %message_id, "Notification spooled to outbox");
        Ok(DeliveryReceipt { message_id })
    }
}
