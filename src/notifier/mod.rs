pub mod telegram;
pub mod webhook;

use crate::config::NotifierConfig;
use crate::model::NotifyError;
use std::time::Duration;

pub use telegram::TelegramNotifier;
pub use webhook::WebhookNotifier;

/// Per-request timeout shared by the HTTP notifiers.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers a plain-text alert somewhere a human will read it.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<(), NotifyError>;
}

/// Builds the notifier selected in the configuration.
pub fn from_config(config: &NotifierConfig) -> Result<Box<dyn Notifier>, NotifyError> {
    match config {
        NotifierConfig::Slack { webhook_url } => {
            Ok(Box::new(WebhookNotifier::new(webhook_url.clone())?))
        }
        NotifierConfig::Telegram { bot_token, chat_id } => {
            Ok(Box::new(TelegramNotifier::new(bot_token.clone(), *chat_id)?))
        }
    }
}

pub(crate) fn http_client() -> Result<reqwest::Client, NotifyError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| NotifyError::ApiError(format!("Failed to create HTTP client: {}", e)))
}

/// Maps a reqwest response onto the notifier result, keeping the body of rejections.
pub(crate) async fn check_response(
    channel: &str,
    response: reqwest::Response,
) -> Result<(), NotifyError> {
    let status = response.status();
    let body = response.text().await.unwrap_or_else(|_| "unknown".into());
    if !status.is_success() {
        tracing::warn!("{} rejected message [{}]: {}", channel, status, body);
        return Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    tracing::info!("{} message sent [{}]", channel, status);
    Ok(())
}

pub(crate) fn send_error(channel: &str, err: reqwest::Error) -> NotifyError {
    tracing::warn!("{} send() failed: {:?}", channel, err);
    if err.is_timeout() || err.is_connect() {
        NotifyError::Unreachable
    } else {
        NotifyError::ApiError(format!("Send failed: {}", err))
    }
}
