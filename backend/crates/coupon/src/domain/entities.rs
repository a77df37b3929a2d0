//! Domain Entities
//!
//! Core business entities for the coupon domain.

use crate::domain::value_objects::{CouponId, IdentitySignal};
use chrono::{DateTime, Utc};

/// Coupon entity - a distributable code and its claim state
///
/// `claimed_by` is set exactly once and never cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    /// Network identity of the claimant; `None` while available
    pub claimed_by: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl Coupon {
    pub fn new(id: CouponId, code: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            claimed_by: None,
            claimed_at: None,
        }
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed_by.is_some()
    }

    /// Assign the coupon to `claimant` if still available.
    /// Returns `false` and leaves the coupon untouched if already claimed.
    pub fn claim(&mut self, claimant: &str, at: DateTime<Utc>) -> bool {
        if self.is_claimed() {
            return false;
        }
        self.claimed_by = Some(claimant.to_string());
        self.claimed_at = Some(at);
        true
    }
}

/// CooldownEntry entity - last successful claim of one identity signal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownEntry {
    pub signal: IdentitySignal,
    pub last_claim_at_ms: i64,
}
