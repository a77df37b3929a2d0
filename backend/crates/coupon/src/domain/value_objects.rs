//! Domain Value Objects
//!
//! Immutable value types for the coupon domain.

use crate::domain::entities::Coupon;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Coupon identifier. Assigned by the store in insertion order, so ordering
/// by id is FIFO distribution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CouponId(i64);

impl CouponId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for CouponId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque token handed to a client after its first claim.
///
/// Only constructed by `application::client_token`, which either mints a
/// fresh token or verifies the signature of one read back from a cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientToken(String);

impl ClientToken {
    pub(crate) fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Rate-limiting key. Namespaced by origin so a token value can never
/// collide with an address.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentitySignal(String);

impl IdentitySignal {
    pub fn network(ip: IpAddr) -> Self {
        Self(format!("ip:{}", ip))
    }

    pub fn client_token(token: &ClientToken) -> Self {
        Self(format!("token:{}", token.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentitySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Answer to "may this signal claim right now"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    Clear,
    CoolingDown { remaining: Duration },
}

impl CooldownStatus {
    pub fn remaining(&self) -> Option<Duration> {
        match self {
            CooldownStatus::Clear => None,
            CooldownStatus::CoolingDown { remaining } => Some(*remaining),
        }
    }
}

/// Outcome of reserving the next coupon. Exhaustion is a normal outcome,
/// not a store failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reservation {
    Claimed(Coupon),
    Exhausted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signals_are_namespaced() {
        let ip: IpAddr = "203.0.113.7".parse().unwrap();
        let token = ClientToken::new("203.0.113.7".to_string());

        let network = IdentitySignal::network(ip);
        let client = IdentitySignal::client_token(&token);

        assert_eq!(network.as_str(), "ip:203.0.113.7");
        assert_eq!(client.as_str(), "token:203.0.113.7");
        assert_ne!(network, client);
    }

    #[test]
    fn test_cooldown_status() {
        assert_eq!(CooldownStatus::Clear.remaining(), None);

        let blocked = CooldownStatus::CoolingDown {
            remaining: Duration::from_millis(1),
        };
        assert_eq!(blocked.remaining(), Some(Duration::from_millis(1)));
    }

    #[test]
    fn test_coupon_id_ordering() {
        assert!(CouponId::new(1) < CouponId::new(2));
        assert_eq!(CouponId::new(7).to_string(), "7");
    }
}
