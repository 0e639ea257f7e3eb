//! Form Relay Server
//!
//! Receives lead and consultation form submissions from the marketing site,
//! sanitizes them and forwards a formatted notification to a Telegram chat,
//! with a per-client minimum interval between submissions.

pub mod api;
pub mod config;
pub mod ratelimit;
pub mod relay;
