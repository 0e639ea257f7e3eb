//! Rate limiting configuration.

use std::time::Duration;

/// Where the "last accepted submission" state lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitBackend {
    /// Process-local map, lost on restart.
    Memory,
    /// Shared Redis keys with a TTL.
    Redis,
}

/// Which property of the request identifies a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitIdentity {
    /// Client IP address (IPv6 normalized to /64).
    Ip,
    /// Opaque session id carried in a cookie.
    Session,
}

/// Configuration for the rate limiting system.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled
    pub enabled: bool,
    /// Minimum interval between accepted submissions from one client
    pub interval_secs: u64,
    /// Memory backend capacity before the oldest key is evicted
    pub max_entries: usize,
    /// How clients are identified
    pub identity: RateLimitIdentity,
    /// Whether to trust X-Forwarded-For / X-Real-IP headers
    pub trust_proxy: bool,
    /// Storage backend
    pub backend: RateLimitBackend,
    /// Redis connection URL (redis backend only)
    pub redis_url: String,
    /// Prefix for Redis keys (e.g., "relay:rl")
    pub redis_key_prefix: String,
    /// Whether to allow requests when Redis is unavailable
    pub fail_open: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 5,
            max_entries: 1000,
            identity: RateLimitIdentity::Ip,
            trust_proxy: false,
            backend: RateLimitBackend::Memory,
            redis_url: "redis://localhost:6379".to_string(),
            redis_key_prefix: "relay:rl".to_string(),
            fail_open: true,
        }
    }
}

impl RateLimitConfig {
    /// Creates configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RATE_LIMIT_ENABLED`: Enable/disable rate limiting (default: true)
    /// - `RATE_LIMIT_INTERVAL_SECS`: Minimum interval between submissions (default: 5)
    /// - `RATE_LIMIT_MAX_ENTRIES`: Memory backend capacity (default: 1000)
    /// - `RATE_LIMIT_IDENTITY`: "ip" or "session" (default: ip)
    /// - `RATE_LIMIT_TRUST_PROXY`: Trust X-Forwarded-For headers (default: false)
    /// - `RATE_LIMIT_BACKEND`: "memory" or "redis" (default: memory)
    /// - `RATE_LIMIT_REDIS_URL`: Redis URL (default: redis://localhost:6379)
    /// - `RATE_LIMIT_PREFIX`: Redis key prefix (default: "relay:rl")
    /// - `RATE_LIMIT_FAIL_OPEN`: Allow requests when Redis unavailable (default: true)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("RATE_LIMIT_ENABLED") {
            config.enabled = val.parse().unwrap_or(true);
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_INTERVAL_SECS") {
            if let Ok(secs) = val.trim().parse() {
                config.interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_MAX_ENTRIES") {
            if let Some(max) = val.trim().parse().ok().filter(|&n: &usize| n > 0) {
                config.max_entries = max;
            }
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_IDENTITY") {
            if let Some(identity) = parse_identity(&val) {
                config.identity = identity;
            }
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_TRUST_PROXY") {
            config.trust_proxy = val.parse().unwrap_or(false);
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_BACKEND") {
            if let Some(backend) = parse_backend(&val) {
                config.backend = backend;
            }
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_REDIS_URL") {
            config.redis_url = val;
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_PREFIX") {
            config.redis_key_prefix = val;
        }
        if let Ok(val) = std::env::var("RATE_LIMIT_FAIL_OPEN") {
            config.fail_open = val.parse().unwrap_or(true);
        }

        config
    }

    /// Minimum interval between accepted submissions.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

fn parse_identity(val: &str) -> Option<RateLimitIdentity> {
    match val.trim().to_ascii_lowercase().as_str() {
        "ip" => Some(RateLimitIdentity::Ip),
        "session" => Some(RateLimitIdentity::Session),
        _ => None,
    }
}

fn parse_backend(val: &str) -> Option<RateLimitBackend> {
    match val.trim().to_ascii_lowercase().as_str() {
        "memory" => Some(RateLimitBackend::Memory),
        "redis" => Some(RateLimitBackend::Redis),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.interval(), Duration::from_secs(5));
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.identity, RateLimitIdentity::Ip);
        assert_eq!(config.backend, RateLimitBackend::Memory);
        assert!(!config.trust_proxy);
        assert!(config.fail_open);
    }

    #[test]
    fn test_parse_identity() {
        assert_eq!(parse_identity("ip"), Some(RateLimitIdentity::Ip));
        assert_eq!(parse_identity(" Session "), Some(RateLimitIdentity::Session));
        assert_eq!(parse_identity("cookie"), None);
    }

    #[test]
    fn test_parse_backend() {
        assert_eq!(parse_backend("memory"), Some(RateLimitBackend::Memory));
        assert_eq!(parse_backend("REDIS"), Some(RateLimitBackend::Redis));
        assert_eq!(parse_backend("postgres"), None);
    }
}
