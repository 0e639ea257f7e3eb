//! Telegram Bot API client.
//!
//! A single `sendMessage` call per notification. No retries: a failure is
//! reported to the submitter, who resubmits.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// Failures talking to the Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Connection, TLS or timeout failure.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {}", .description.as_deref().unwrap_or("no description"))]
    Status {
        status: u16,
        description: Option<String>,
    },

    /// 2xx response whose `ok` flag is not true.
    #[error("rejected: {}", .0.as_deref().unwrap_or("no description"))]
    Rejected(Option<String>),

    /// Body was not a Bot API response.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for TelegramError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL embeds the bot token.
        Self::Transport(err.without_url())
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Client for posting notifications into one chat.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    send_url: String,
    chat_id: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Build a client from server configuration.
    pub fn new(config: &Config) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder()
            .timeout(config.telegram_timeout())
            .build()?;

        Ok(Self {
            http,
            send_url: format!(
                "{}/bot{}/sendMessage",
                config.telegram_api_base, config.telegram_bot_token
            ),
            chat_id: config.telegram_chat_id.clone(),
        })
    }

    /// Post `text` (Telegram HTML) to the configured chat.
    pub async fn send_message(&self, text: &str) -> Result<(), TelegramError> {
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response = self.http.post(&self.send_url).json(&payload).send().await?;
        let status = response.status();
        let body = response.text().await?;
        let parsed: Result<ApiResponse, _> = serde_json::from_str(&body);

        if !status.is_success() {
            return Err(TelegramError::Status {
                status: status.as_u16(),
                description: parsed.ok().and_then(|r| r.description),
            });
        }

        let parsed = parsed.map_err(|e| TelegramError::MalformedResponse(e.to_string()))?;
        if !parsed.ok {
            return Err(TelegramError::Rejected(parsed.description));
        }

        debug!(chat_id = %self.chat_id, "Telegram message sent");
        Ok(())
    }
}
