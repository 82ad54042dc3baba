//! Telegram bot notifier.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::domain::error::TickwatchError;
use crate::domain::notification::{MessageFormat, Notification};
use crate::ports::notify_port::NotifyPort;

pub const API_URL: &str = "https://api.telegram.org";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct TelegramNotifier {
    client: Client,
    api_url: String,
    recipient: String,
    sender: String,
    auth: String,
    format: MessageFormat,
}

impl TelegramNotifier {
    pub fn new(
        recipient: &str,
        sender: &str,
        auth: &str,
        format: MessageFormat,
    ) -> Result<Self, TickwatchError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TickwatchError::Delivery {
                notifier: "telegram".to_string(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            api_url: API_URL.to_string(),
            recipient: recipient.to_string(),
            sender: sender.to_string(),
            auth: auth.to_string(),
            format,
        })
    }

    /// `sendMessage` endpoint for the configured bot.
    fn endpoint(&self) -> String {
        format!("{}/bot{}:{}/sendMessage", self.api_url, self.sender, self.auth)
    }
}

impl NotifyPort for TelegramNotifier {
    fn send(&self, notification: &Notification) -> Result<(), TickwatchError> {
        let text = notification.format(self.format);
        self.client
            .get(self.endpoint())
            .query(&[("chat_id", self.recipient.as_str()), ("text", text.as_str())])
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| TickwatchError::Delivery {
                notifier: self.name().to_string(),
                // the URL carries the bot token
                reason: e.without_url().to_string(),
            })?;
        tracing::debug!(recipient = %self.recipient, "telegram message sent");
        Ok(())
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
