//! Client IP resolution for rate limiting.

use axum::http::HeaderMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::ratelimit::constants::IPV6_PREFIX_SEGMENTS;

/// Resolve the submitting client's IP.
///
/// Proxy headers are only consulted when `trust_proxy` is set: the first
/// `X-Forwarded-For` hop wins over `X-Real-IP`. Otherwise the socket peer is
/// used, or loopback when the transport provides none.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> IpAddr {
    if trust_proxy {
        if let Some(ip) = forwarded_ip(headers) {
            return ip;
        }
    }
    peer.map_or(IpAddr::V4(Ipv4Addr::LOCALHOST), |addr| addr.ip())
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let from_forwarded_for = headers
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|first| first.trim().parse().ok());

    from_forwarded_for.or_else(|| {
        headers
            .get("X-Real-IP")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse().ok())
    })
}

/// Normalize an IP into a rate limit identifier.
///
/// IPv6 clients are grouped by /64 so rotating addresses inside one
/// allocation does not reset the limit. IPv4-mapped IPv6 addresses are
/// treated as IPv4.
pub fn normalize_ip(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return v4.to_string();
            }
            let seg = v6.segments();
            let prefix: Vec<String> = seg[..IPV6_PREFIX_SEGMENTS]
                .iter()
                .map(|s| format!("{s:x}"))
                .collect();
            format!("{}::/64", prefix.join(":"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    fn peer() -> Option<SocketAddr> {
        Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 40000))
    }

    #[test]
    fn test_peer_address_without_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", "203.0.113.50".parse().unwrap());

        let ip = client_ip(&headers, peer(), false);
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)));
    }

    #[test]
    fn test_first_forwarded_hop_with_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Forwarded-For",
            "203.0.113.50, 70.41.3.18".parse().unwrap(),
        );
        headers.insert("X-Real-IP", "198.51.100.25".parse().unwrap());

        let ip = client_ip(&headers, peer(), true);
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(203, 0, 113, 50)));
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", "garbage".parse().unwrap());
        headers.insert("X-Real-IP", "198.51.100.25".parse().unwrap());

        let ip = client_ip(&headers, peer(), true);
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(198, 51, 100, 25)));
    }

    #[test]
    fn test_loopback_when_nothing_known() {
        let ip = client_ip(&HeaderMap::new(), None, true);
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(
            normalize_ip(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100))),
            "192.168.1.100"
        );
        assert_eq!(
            normalize_ip(IpAddr::V6(Ipv6Addr::new(
                0x2001, 0xdb8, 0x85a3, 0x1234, 0, 0, 0, 1
            ))),
            "2001:db8:85a3:1234::/64"
        );
        assert_eq!(
            normalize_ip(IpAddr::V6(Ipv4Addr::new(192, 0, 2, 7).to_ipv6_mapped())),
            "192.0.2.7"
        );
    }
}
