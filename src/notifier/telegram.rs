use crate::model::NotifyError;
use crate::notifier::{check_response, http_client, send_error, Notifier};
use reqwest::Client;
use tracing::info;

const TELEGRAM_API: &str = "https://api.telegram.org";

/// Posts alerts through the Telegram bot `sendMessage` method.
pub struct TelegramNotifier {
    bot_token: String,
    chat_id: i64,
    api_base: String,
    client: Client,
}

impl TelegramNotifier {
    pub fn new(bot_token: String, chat_id: i64) -> Result<Self, NotifyError> {
        Ok(Self {
            bot_token,
            chat_id,
            api_base: TELEGRAM_API.to_string(),
            client: http_client()?,
        })
    }

    /// Points the notifier at another Bot API host, e.g. a local bot server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        info!("Sending Telegram message: {}", text);
        let params = [
            ("chat_id", self.chat_id.to_string()),
            ("text", text.to_string()),
        ];
        let response = self
            .client
            .post(self.send_message_url())
            .form(&params)
            .send()
            .await
            .map_err(|e| send_error("Telegram", e))?;
        check_response("Telegram", response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_message_url() {
        let notifier = TelegramNotifier::new("123:abc".into(), 42)
            .unwrap()
            .with_api_base("http://localhost:8081/");
        assert_eq!(
            notifier.send_message_url(),
            "http://localhost:8081/bot123:abc/sendMessage"
        );
    }
}
