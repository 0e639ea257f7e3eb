//! Relay HTTP handlers.

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::{info, warn};

use super::error::{InputError, RelayError, RelayResult};
use super::format::render;
use super::types::{RelayResponse, Submission};
use crate::api::AppState;
use crate::ratelimit::ClientKey;

/// Acknowledgement returned to the form on success.
pub const ACCEPTED_MESSAGE: &str = "Request submitted successfully";

/// POST /api/telegram
///
/// Runs after the rate limit middleware, which leaves the `ClientKey` in
/// request extensions.
#[tracing::instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    request: Request,
) -> RelayResult<Json<RelayResponse>> {
    let client = request
        .extensions()
        .get::<ClientKey>()
        .cloned()
        .unwrap_or_else(|| ClientKey("unknown".into()));

    let body = to_bytes(request.into_body(), state.config.max_body_size)
        .await
        .map_err(|_| InputError::MalformedBody)?;

    match relay(&state, &body).await {
        Ok(submission) => {
            info!(
                client = %client,
                form_type = submission.form_type.as_str(),
                "Submission relayed"
            );
            Ok(Json(RelayResponse::accepted(ACCEPTED_MESSAGE)))
        }
        Err(err) => {
            match &err {
                RelayError::Delivery(cause) => {
                    warn!(client = %client, error = %cause, "Telegram delivery failed");
                }
                other => {
                    info!(client = %client, reason = %other, "Submission rejected");
                }
            }
            Err(err)
        }
    }
}

/// Parse, sanitize, render and forward one submission body.
async fn relay(state: &AppState, body: &[u8]) -> RelayResult<Submission> {
    let raw: Value = serde_json::from_slice(body).map_err(|_| InputError::MalformedBody)?;
    if !raw.is_object() {
        return Err(InputError::MalformedBody.into());
    }

    let submission = Submission::from_json(raw)?;
    let message = render(&submission)?;
    state.telegram.send_message(&message).await?;

    Ok(submission)
}

/// OPTIONS /api/telegram
///
/// Preflights carrying CORS headers are answered by the CORS layer; this
/// covers bare OPTIONS requests.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any other method on the relay path.
pub async fn method_not_allowed() -> RelayError {
    RelayError::MethodNotAllowed
}
