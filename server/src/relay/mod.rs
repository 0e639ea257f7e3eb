//! Form Relay
//!
//! Accepts site form submissions, sanitizes them, renders a notification and
//! forwards it to a Telegram chat.

pub mod error;
pub mod format;
pub mod handlers;
pub mod sanitize;
pub mod telegram;
pub mod types;

use axum::{middleware::from_fn_with_state, routing::post, Router};

use crate::api::AppState;
use crate::ratelimit::rate_limit_submissions;

pub use error::{InputError, RelayError, RelayResult};
pub use telegram::{TelegramClient, TelegramError};
pub use types::{FormType, RelayResponse, SafeText, Submission};

/// Path the site forms post to.
pub const RELAY_PATH: &str = "/api/telegram";

/// Create the relay router.
///
/// - POST /api/telegram - Relay a submission (rate limited)
/// - OPTIONS /api/telegram - Preflight
/// - anything else on that path - 405
pub fn router(state: AppState) -> Router<AppState> {
    Router::new().route(
        RELAY_PATH,
        post(handlers::submit)
            .options(handlers::preflight)
            .fallback(handlers::method_not_allowed)
            .layer(from_fn_with_state(state, rate_limit_submissions)),
    )
}
