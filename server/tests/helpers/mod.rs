//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum
//! router, with the Bot API replaced by a `wiremock` server and the rate
//! limiter driven by a `ManualClock`.
//!
//! The router is cloned per request; clones share the limiter state, so
//! rate limiting can be exercised with `tower::ServiceExt::oneshot`.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use form_relay::api::{create_router, AppState};
use form_relay::config::Config;
use form_relay::ratelimit::{ManualClock, RateLimitConfig, RateLimiter};
use form_relay::relay::TelegramClient;

/// Bot API path for the test token.
pub const SEND_PATH: &str = "/bottest-token/sendMessage";

/// Full application wired to a mock Bot API.
pub struct TestApp {
    pub router: Router,
    pub clock: ManualClock,
    pub telegram: MockServer,
}

/// Parsed response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }
}

/// Rate limit config used by most tests: default interval, proxy headers
/// trusted so each test can pick client IPs.
pub fn test_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        trust_proxy: true,
        ..RateLimitConfig::default()
    }
}

impl TestApp {
    /// App with the default rate limiter.
    pub async fn new() -> Self {
        Self::with_rate_limit(Some(test_rate_limit_config())).await
    }

    /// App with a custom (or no) rate limiter.
    pub async fn with_rate_limit(rl_config: Option<RateLimitConfig>) -> Self {
        let telegram = MockServer::start().await;
        let config = Config::default_for_test(&telegram.uri());
        Self::build(config, rl_config, telegram)
    }

    /// App with a customized server config.
    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let telegram = MockServer::start().await;
        let mut config = Config::default_for_test(&telegram.uri());
        customize(&mut config);
        Self::build(config, Some(test_rate_limit_config()), telegram)
    }

    fn build(config: Config, rl_config: Option<RateLimitConfig>, telegram: MockServer) -> Self {
        let clock = ManualClock::new();
        let limiter =
            rl_config.map(|rl| RateLimiter::memory_with_clock(rl, Arc::new(clock.clone())));
        let client = TelegramClient::new(&config).expect("Failed to build Telegram client");
        let state = AppState::new(config, client, limiter);

        Self {
            router: create_router(state),
            clock,
            telegram,
        }
    }

    /// Make the mock Bot API accept messages, expecting `calls` of them.
    pub async fn telegram_accepts(&self, calls: u64) {
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true, "result": {"message_id": 1}})),
            )
            .expect(calls)
            .mount(&self.telegram)
            .await;
    }

    /// Make the mock Bot API answer with `status` and `body`.
    pub async fn telegram_responds(&self, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path(SEND_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(1)
            .mount(&self.telegram)
            .await;
    }

    /// Texts of all messages the mock Bot API received.
    pub async fn sent_texts(&self) -> Vec<String> {
        self.telegram
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|req| {
                let body: Value = serde_json::from_slice(&req.body).expect("JSON payload");
                body["text"].as_str().unwrap_or_default().to_string()
            })
            .collect()
    }

    /// Send an arbitrary request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// POST a JSON body to the relay as client `ip`.
    pub async fn submit(&self, ip: &str, body: &Value) -> TestResponse {
        self.submit_raw(ip, body.to_string()).await
    }

    /// POST a raw body to the relay as client `ip`.
    pub async fn submit_raw(&self, ip: &str, body: impl Into<String>) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/telegram")
            .header(header::CONTENT_TYPE, "application/json")
            .header("X-Forwarded-For", ip)
            .body(Body::from(body.into()))
            .expect("valid request");
        self.send(request).await
    }
}
