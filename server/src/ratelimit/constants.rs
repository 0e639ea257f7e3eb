//! Rate limiting constants.

/// IPv6 prefix segments for rate limiting (uses /64)
pub const IPV6_PREFIX_SEGMENTS: usize = 4;

/// Cookie carrying the session id in session identity mode
pub const SESSION_COOKIE: &str = "relay_session";

/// Session cookie lifetime in seconds
pub const SESSION_COOKIE_MAX_AGE_SECS: i64 = 24 * 60 * 60;

/// Redis TTL sentinel values
pub const TTL_NO_EXPIRY: i64 = -1;
pub const TTL_KEY_NOT_FOUND: i64 = -2;
