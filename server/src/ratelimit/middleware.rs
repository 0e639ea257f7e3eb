//! Axum middleware for rate limiting submissions.

use axum::{
    extract::{ConnectInfo, Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use std::net::SocketAddr;
use tracing::{debug, error, warn};

use crate::api::AppState;
use crate::ratelimit::{resolve_identity, ClientKey, RateDecision, RateLimitError};
use crate::relay::RelayError;

/// Middleware enforcing the minimum interval between submissions.
///
/// # Behavior
///
/// - Only `POST` requests are checked; preflights and rejected methods pass through.
/// - If the rate limiter is not configured (`state.rate_limiter` is `None`), requests pass through.
/// - If the store is unavailable and `fail_open` is true, requests pass through with a warning.
/// - If the client submitted too recently, returns `429 Too Many Requests` with `Retry-After`.
/// - Stores the resolved `ClientKey` in request extensions for the handler.
/// - Attaches a `Set-Cookie` header whenever a session id was issued, error
///   responses included.
#[tracing::instrument(skip_all)]
pub async fn rate_limit_submissions(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.method() != Method::POST {
        return next.run(request).await;
    }

    let Some(ref rate_limiter) = state.rate_limiter else {
        return next.run(request).await;
    };

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|c| c.0);
    let identity = resolve_identity(rate_limiter.config(), request.headers(), peer);
    let key = identity.key;

    debug!(client = %key, "Checking submission rate limit");
    request.extensions_mut().insert(key.clone());

    let checked = rate_limiter.check_and_record(&key.0).await;
    let response = match admit(&key, checked, rate_limiter.config().fail_open) {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    };

    with_session_cookie(response, identity.issued_cookie)
}

/// Map a store result to admission or the error returned to the client.
fn admit(
    key: &ClientKey,
    checked: Result<RateDecision, RateLimitError>,
    fail_open: bool,
) -> Result<(), RelayError> {
    let decision = match checked {
        Ok(decision) => decision,
        Err(RateLimitError::StoreUnavailable(reason)) => {
            if fail_open {
                warn!(
                    client = %key,
                    reason = %reason,
                    "Rate limit store unavailable, allowing request (fail_open=true)"
                );
                RateDecision::Allowed
            } else {
                error!(client = %key, reason = %reason, "Rate limit store unavailable");
                return Err(RelayError::Internal(reason));
            }
        }
    };

    if let RateDecision::Limited { .. } = decision {
        debug!(
            client = %key,
            retry_after = decision.retry_after_secs(),
            "Submission rate limit exceeded"
        );
        return Err(RelayError::RateLimited {
            retry_after: decision.retry_after_secs(),
        });
    }

    Ok(())
}

fn with_session_cookie(response: Response, cookie: Option<Cookie<'static>>) -> Response {
    match cookie {
        Some(cookie) => (CookieJar::new().add(cookie), response).into_response(),
        None => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::SESSION_COOKIE;
    use axum::http::{header::SET_COOKIE, StatusCode};
    use std::time::Duration;

    fn key() -> ClientKey {
        ClientKey("session:abc".into())
    }

    fn unavailable() -> Result<RateDecision, RateLimitError> {
        Err(RateLimitError::StoreUnavailable("connection refused".into()))
    }

    #[test]
    fn test_store_failure_fails_open() {
        assert!(admit(&key(), unavailable(), true).is_ok());
    }

    #[test]
    fn test_store_failure_fails_closed() {
        assert!(matches!(
            admit(&key(), unavailable(), false),
            Err(RelayError::Internal(_))
        ));
    }

    #[test]
    fn test_limited_maps_to_retry_after() {
        let limited = Ok(RateDecision::Limited {
            retry_after: Duration::from_millis(2500),
        });
        assert!(matches!(
            admit(&key(), limited, false),
            Err(RelayError::RateLimited { retry_after: 3 })
        ));
    }

    #[test]
    fn test_issued_cookie_survives_store_failure() {
        let err = admit(&key(), unavailable(), false).unwrap_err();
        let response = with_session_cookie(
            err.into_response(),
            Some(Cookie::new(SESSION_COOKIE, "abc")),
        );

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.starts_with("relay_session=abc"));
    }

    #[test]
    fn test_no_cookie_when_none_issued() {
        let response = with_session_cookie(StatusCode::OK.into_response(), None);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }
}
