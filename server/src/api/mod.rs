//! API Router and Application State
//!
//! Central routing configuration and shared state.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::{config::Config, ratelimit::RateLimiter, relay, relay::TelegramClient};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration
    pub config: Arc<Config>,
    /// Outbound Bot API client
    pub telegram: TelegramClient,
    /// Submission rate limiter (optional)
    pub rate_limiter: Option<RateLimiter>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(config: Config, telegram: TelegramClient, rate_limiter: Option<RateLimiter>) -> Self {
        Self {
            config: Arc::new(config),
            telegram,
            rate_limiter,
        }
    }
}

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let max_body_size = state.config.max_body_size;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Form relay
        .merge(relay::router(state.clone()))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(max_body_size))
        // State
        .with_state(state)
}

/// CORS policy: POST/OPTIONS with a JSON body, from any origin or the
/// configured one.
fn cors_layer(config: &Config) -> CorsLayer {
    let origin = match config.cors_allowed_origin.as_deref() {
        Some(origin) => match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                warn!(origin = %origin, "Invalid CORS origin, rejecting cross-origin requests");
                AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        },
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

/// Health check response.
#[derive(Serialize)]
struct HealthResponse {
    /// Service status
    status: &'static str,
    /// Whether rate limiting is enabled
    rate_limiting: bool,
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        rate_limiting: state.rate_limiter.is_some(),
    })
}
