//! Client identity for rate limiting.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::net::SocketAddr;

use crate::ratelimit::{
    client_ip, normalize_ip, ClientKey, RateLimitConfig, RateLimitIdentity, SESSION_COOKIE,
    SESSION_COOKIE_MAX_AGE_SECS,
};

/// Upper bound on an accepted session id; longer values are replaced.
const MAX_SESSION_ID_LEN: usize = 128;

/// Resolved identity plus a cookie to hand back when a session was issued.
#[derive(Debug)]
pub struct ResolvedIdentity {
    pub key: ClientKey,
    pub issued_cookie: Option<Cookie<'static>>,
}

/// Work out who is submitting.
pub fn resolve_identity(
    config: &RateLimitConfig,
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
) -> ResolvedIdentity {
    match config.identity {
        RateLimitIdentity::Ip => {
            let ip = client_ip(headers, peer, config.trust_proxy);
            ResolvedIdentity {
                key: ClientKey(format!("ip:{}", normalize_ip(ip))),
                issued_cookie: None,
            }
        }
        RateLimitIdentity::Session => {
            let jar = CookieJar::from_headers(headers);
            let existing = jar
                .get(SESSION_COOKIE)
                .map(|c| c.value().trim().to_string())
                .filter(|v| is_valid_session_id(v));

            match existing {
                Some(id) => ResolvedIdentity {
                    key: ClientKey(format!("session:{id}")),
                    issued_cookie: None,
                },
                None => {
                    let id = uuid::Uuid::now_v7().simple().to_string();
                    ResolvedIdentity {
                        key: ClientKey(format!("session:{id}")),
                        issued_cookie: Some(session_cookie(id)),
                    }
                }
            }
        }
    }
}

fn is_valid_session_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_SESSION_ID_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

fn session_cookie(id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(SESSION_COOKIE_MAX_AGE_SECS))
        .build()
}
