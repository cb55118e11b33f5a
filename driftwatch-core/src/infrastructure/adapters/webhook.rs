// driftwatch-core/src/infrastructure/adapters/webhook.rs

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::DriftwatchError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::notifier::{DeliveryReceipt, Notification, NotificationDispatcher};

/// Posts each notification as `multipart/form-data` to a relay endpoint.
/// Any non-2xx answer is a delivery failure.
pub struct WebhookDispatcher {
    url: String,
    http_client: reqwest::Client,
}

impl WebhookDispatcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, InfrastructureError> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(InfrastructureError::ConfigError(format!(
                "webhook url must be http(s): '{}'",
                url
            )));
        }

        let http_client = reqwest::Client::builder()
            .user_agent(concat!("driftwatch/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| InfrastructureError::ConfigError(e.to_string()))?;

        Ok(Self { url, http_client })
    }

    fn form(message_id: &str, notification: &Notification) -> Result<Form, InfrastructureError> {
        let attachment = &notification.attachment;
        let file = Part::bytes(attachment.content.clone())
            .file_name(attachment.filename.clone())
            .mime_str(&attachment.content_type)
            .map_err(|e| InfrastructureError::DeliveryError(e.to_string()))?;

        Ok(Form::new()
            .text("message_id", message_id.to_string())
            .text("report_id", notification.report_id.simple().to_string())
            .text("report_key", notification.report_key.clone())
            .text("from", notification.sender.clone())
            .text("to", notification.recipient.clone())
            .text("subject", notification.subject.clone())
            .text("body", notification.body.clone())
            .part("attachment", file))
    }
}

#[async_trait]
impl NotificationDispatcher for WebhookDispatcher {
    #[instrument(skip_all, fields(url = %self.url, to = %notification.recipient))]
    async fn send(&self, notification: &Notification) -> Result<DeliveryReceipt, DriftwatchError> {
        let message_id = Uuid::new_v4().simple().to_string();
        let form = Self::form(&message_id, notification)?;

        let response = self
            .http_client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| InfrastructureError::DeliveryError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InfrastructureError::DeliveryError(format!(
                "relay answered {}",
                status
            ))
            .into());
        }

        info!(message_id = %message_id, "Notification posted");
        Ok(DeliveryReceipt { message_id })
    }
}
