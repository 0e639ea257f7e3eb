//! Rate limiting module for protecting the relay against abuse.
//!
//! Enforces a minimum interval between accepted submissions per client,
//! backed by either a bounded in-memory map or Redis.

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;
pub mod identity;
pub mod ip;
pub mod limiter;
pub mod memory;
pub mod middleware;
pub mod redis;
pub mod types;

pub use clock::*;
pub use config::*;
pub use constants::*;
pub use error::*;
pub use identity::*;
pub use ip::*;
pub use limiter::*;
pub use memory::*;
pub use middleware::rate_limit_submissions;
pub use redis::{create_redis_client, RedisStore};
pub use types::*;
