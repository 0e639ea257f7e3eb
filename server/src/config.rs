//! Server Configuration
//!
//! Loads configuration from environment variables.

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::env;
use std::time::Duration;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:3000")
    pub bind_address: String,

    /// Telegram bot token used to authenticate against the Bot API
    pub telegram_bot_token: String,

    /// Chat that receives the notifications
    pub telegram_chat_id: String,

    /// Bot API base URL (default: <https://api.telegram.org>)
    pub telegram_api_base: String,

    /// Timeout for the outbound `sendMessage` call in seconds (default: 10)
    pub telegram_timeout_secs: u64,

    /// Single allowed CORS origin; any origin when unset
    pub cors_allowed_origin: Option<String>,

    /// Maximum accepted request body in bytes (default: 16 KiB)
    pub max_body_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Fails when the Telegram credentials are missing or empty; the relay
    /// cannot operate without them.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: required("TELEGRAM_CHAT_ID")?,
            telegram_api_base: env::var("TELEGRAM_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| "https://api.telegram.org".into()),
            telegram_timeout_secs: env::var("TELEGRAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            cors_allowed_origin: cors_origin()?,
            max_body_size: env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(16 * 1024),
        })
    }

    /// Outbound request timeout.
    #[must_use]
    pub const fn telegram_timeout(&self) -> Duration {
        Duration::from_secs(self.telegram_timeout_secs)
    }

    /// Create a default configuration for testing.
    ///
    /// Points the Bot API at `api_base`, typically a local mock server.
    #[must_use]
    pub fn default_for_test(api_base: &str) -> Self {
        Self {
            bind_address: "127.0.0.1:3000".into(),
            telegram_bot_token: "test-token".into(),
            telegram_chat_id: "-100123".into(),
            telegram_api_base: api_base.trim_end_matches('/').to_string(),
            telegram_timeout_secs: 2,
            cors_allowed_origin: None,
            max_body_size: 16 * 1024,
        }
    }
}

/// Reads a variable that must be present and non-blank.
fn required(name: &str) -> Result<String> {
    let value = env::var(name).with_context(|| format!("{name} must be set"))?;
    let value = value.trim();
    if value.is_empty() {
        anyhow::bail!("{name} must not be empty");
    }
    Ok(value.to_string())
}

/// Reads the optional single CORS origin; it must be a valid header value.
fn cors_origin() -> Result<Option<String>> {
    let Some(origin) = env::var("CORS_ALLOWED_ORIGIN")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
    else {
        return Ok(None);
    };
    HeaderValue::from_str(&origin)
        .with_context(|| format!("CORS_ALLOWED_ORIGIN is not a valid origin: {origin:?}"))?;
    Ok(Some(origin))
}
