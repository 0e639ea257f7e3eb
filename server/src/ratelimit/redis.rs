//! Redis-backed rate limit store.
//!
//! One key per client holding a marker with a TTL equal to the interval.
//! `SET NX PX` makes the check and the record a single atomic step, so the
//! state is shared across relay instances and survives restarts.

use std::time::Duration;

use fred::prelude::*;
use fred::types::{Expiration, SetOptions};
use tracing::info;

use crate::ratelimit::{RateDecision, RateLimitError, TTL_KEY_NOT_FOUND, TTL_NO_EXPIRY};

/// Connect to Redis and wait for the connection to come up.
pub async fn create_redis_client(redis_url: &str) -> Result<Client, RateLimitError> {
    let config = Config::from_url(redis_url)?;
    let client = Client::new(config, None, None, None);
    client.connect();
    client.wait_for_connect().await?;

    info!("Connected to Redis");
    Ok(client)
}

/// Rate limit store using Redis key expiry.
#[derive(Clone)]
pub struct RedisStore {
    redis: Client,
    key_prefix: String,
    min_interval: Duration,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .field("min_interval", &self.min_interval)
            .finish_non_exhaustive()
    }
}

impl RedisStore {
    pub fn new(redis: Client, key_prefix: impl Into<String>, min_interval: Duration) -> Self {
        Self {
            redis,
            key_prefix: key_prefix.into(),
            min_interval,
        }
    }

    fn build_key(&self, identifier: &str) -> String {
        format!("{}:{}", self.key_prefix, identifier)
    }

    /// Atomically check and record a submission for `identifier`.
    pub async fn check_and_record(&self, identifier: &str) -> Result<RateDecision, RateLimitError> {
        let key = self.build_key(identifier);
        let ttl_ms = self.min_interval.as_millis().max(1) as i64;

        let reply: Option<String> = self
            .redis
            .set(
                &key,
                1,
                Some(Expiration::PX(ttl_ms)),
                Some(SetOptions::NX),
                false,
            )
            .await?;

        if reply.is_some() {
            return Ok(RateDecision::Allowed);
        }

        let remaining: i64 = self.redis.pttl(&key).await?;
        let retry_after = match remaining {
            // Expired between the two calls; the next attempt will pass.
            TTL_KEY_NOT_FOUND => Duration::ZERO,
            // A key without expiry would lock the client out forever.
            TTL_NO_EXPIRY => {
                let _: i64 = self.redis.del(&key).await?;
                self.min_interval
            }
            ms => Duration::from_millis(ms.max(0) as u64),
        };

        Ok(RateDecision::Limited { retry_after })
    }
}
