//! Submission rate limiter.
//!
//! Exposes one capability, "check and record an attempt for identifier X",
//! over either the in-memory or the Redis store.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::ratelimit::{
    create_redis_client, Clock, MemoryStore, RateDecision, RateLimitBackend, RateLimitConfig,
    RateLimitError, RedisStore,
};

#[derive(Debug, Clone)]
enum Store {
    Memory(MemoryStore),
    Redis(RedisStore),
}

/// Rate limiter enforcing a minimum interval between accepted submissions.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    store: Store,
    config: Arc<RateLimitConfig>,
}

impl RateLimiter {
    /// Build the limiter described by `config`, connecting to Redis if needed.
    ///
    /// When Redis cannot be reached and `fail_open` is set, falls back to the
    /// in-memory store so submissions stay rate limited per instance.
    pub async fn from_config(config: RateLimitConfig) -> Result<Self, RateLimitError> {
        match config.backend {
            RateLimitBackend::Memory => Ok(Self::memory(config)),
            RateLimitBackend::Redis => match create_redis_client(&config.redis_url).await {
                Ok(client) => {
                    info!(prefix = %config.redis_key_prefix, "Using Redis rate limit store");
                    Ok(Self::redis(client, config))
                }
                Err(e) if config.fail_open => {
                    warn!(
                        error = %e,
                        "Redis unavailable, falling back to in-memory rate limit store"
                    );
                    Ok(Self::memory(config))
                }
                Err(e) => Err(e),
            },
        }
    }

    /// In-memory limiter on the system clock.
    pub fn memory(config: RateLimitConfig) -> Self {
        let store = MemoryStore::new(config.interval(), config.max_entries);
        Self {
            store: Store::Memory(store),
            config: Arc::new(config),
        }
    }

    /// In-memory limiter on an explicit clock.
    pub fn memory_with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let store = MemoryStore::with_clock(config.interval(), config.max_entries, clock);
        Self {
            store: Store::Memory(store),
            config: Arc::new(config),
        }
    }

    /// Redis-backed limiter on an existing client.
    pub fn redis(client: fred::clients::Client, config: RateLimitConfig) -> Self {
        let store = RedisStore::new(client, config.redis_key_prefix.clone(), config.interval());
        Self {
            store: Store::Redis(store),
            config: Arc::new(config),
        }
    }

    /// Store actually in use; differs from `config().backend` after a fallback.
    pub const fn backend(&self) -> RateLimitBackend {
        match self.store {
            Store::Memory(_) => RateLimitBackend::Memory,
            Store::Redis(_) => RateLimitBackend::Redis,
        }
    }

    /// Returns the rate limit configuration.
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check whether `identifier` may submit now; record the attempt if so.
    pub async fn check_and_record(&self, identifier: &str) -> Result<RateDecision, RateLimitError> {
        if !self.config.enabled {
            return Ok(RateDecision::Allowed);
        }

        let decision = match &self.store {
            Store::Memory(store) => store.check_and_record(identifier),
            Store::Redis(store) => store.check_and_record(identifier).await?,
        };

        debug!(
            identifier = %identifier,
            allowed = decision.is_allowed(),
            "Rate limit checked"
        );
        Ok(decision)
    }
}
