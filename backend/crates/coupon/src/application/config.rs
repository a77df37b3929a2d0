//! Application Configuration
//!
//! Configuration for the coupon application layer.

use platform::cookie::CookieConfig;
use std::time::Duration;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Coupon application configuration
#[derive(Debug, Clone)]
pub struct CouponConfig {
    /// How long a signal is blocked after a successful claim
    pub cooldown_window: Duration,
    /// Cookie carrying the client token
    pub token_cookie_name: String,
    /// HMAC key for client tokens (32 bytes)
    pub token_secret: [u8; 32],
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Deadline for a single store call
    pub store_timeout: Duration,
    /// Reservation attempts before contention is reported as unavailability
    pub reserve_max_attempts: u32,
    /// Coupons inserted into an empty pool at startup
    pub seed_coupon_count: u32,
}

impl Default for CouponConfig {
    fn default() -> Self {
        Self {
            cooldown_window: Duration::from_secs(60),
            token_cookie_name: "claim_token".to_string(),
            token_secret: [0u8; 32],
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
            store_timeout: Duration::from_secs(5),
            reserve_max_attempts: 5,
            seed_coupon_count: 10,
        }
    }
}

impl CouponConfig {
    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&platform::crypto::random_bytes(32));
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Cookie settings for the client token; it expires with the cooldown
    pub fn token_cookie(&self) -> CookieConfig {
        CookieConfig::new(self.token_cookie_name.clone(), self.cooldown_window)
            .secure(self.cookie_secure)
            .same_site(self.cookie_same_site)
    }
}
