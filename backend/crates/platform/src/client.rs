//! Client identification utilities
//!
//! Derives the originating client address from proxy headers.

use axum::http::HeaderMap;
use std::net::IpAddr;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Extract the originating client IP address
///
/// Resolution order:
/// 1. First parseable entry of `X-Forwarded-For` (the client, not the proxies)
/// 2. `X-Real-IP`
/// 3. The direct connection address
///
/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) are folded to IPv4 so the
/// same client is not counted twice depending on the listener's socket family.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: IpAddr) -> IpAddr {
    forwarded_for(headers)
        .or_else(|| real_ip(headers))
        .unwrap_or(direct_ip)
        .to_canonical()
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    let xff = headers.get(X_FORWARDED_FOR)?.to_str().ok()?;
    let first = xff.split(',').next()?;
    parse_ip(first)
}

fn real_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let value = headers.get(X_REAL_IP)?.to_str().ok()?;
    parse_ip(value)
}

fn parse_ip(raw: &str) -> Option<IpAddr> {
    let raw = raw.trim();
    // Some proxies bracket IPv6 literals
    let raw = raw
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(raw);
    raw.parse().ok()
}
