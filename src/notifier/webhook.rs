use crate::model::NotifyError;
use crate::notifier::{check_response, http_client, send_error, Notifier};
use reqwest::Client;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Slack-style incoming webhook: POSTs `{"text": ...}` as JSON.
pub struct WebhookNotifier {
    url: String,
    client: Client,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Result<Self, NotifyError> {
        Ok(Self {
            url,
            client: http_client()?,
        })
    }
}

#[async_trait::async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        info!("Posting webhook message: {}", text);
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text })
            .send()
            .await
            .map_err(|e| send_error("Webhook", e))?;
        check_response("Webhook", response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let body = serde_json::to_value(WebhookPayload { text: "Sell historical high" }).unwrap();
        assert_eq!(body, serde_json::json!({"text": "Sell historical high"}));
    }
}
