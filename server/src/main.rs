//! Form Relay Server - Main Entry Point

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tracing::{info, warn};

use form_relay::{
    api, config,
    ratelimit::{RateLimitConfig, RateLimiter},
    relay::TelegramClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "form_relay=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Form Relay"
    );

    let telegram = TelegramClient::new(&config).context("Failed to build Telegram client")?;

    // Initialize rate limiter (optional)
    let rate_limiter = {
        let rl_config = RateLimitConfig::from_env();
        if rl_config.enabled {
            let limiter = RateLimiter::from_config(rl_config)
                .await
                .context("Rate limiter initialization failed")?;
            info!(
                interval_secs = limiter.config().interval_secs,
                identity = ?limiter.config().identity,
                backend = ?limiter.backend(),
                "Rate limiter initialized"
            );
            Some(limiter)
        } else {
            info!("Rate limiting disabled by configuration");
            None
        }
    };

    // Build application state
    let state = api::AppState::new(config.clone(), telegram, rate_limiter);

    // Build router
    let app = api::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(address = %config.bind_address, "Server listening");

    // Graceful shutdown handler
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal, cleaning up...");
    };

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    info!("Server shutdown complete");

    Ok(())
}
