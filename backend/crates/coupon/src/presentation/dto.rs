//! API DTOs (Data Transfer Objects)

use crate::domain::entities::Coupon;
use serde::Serialize;

/// Response for GET|POST /api/claim
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub message: String,
    pub code: String,
    pub cooldown_secs: u64,
}

/// Public view of a coupon. The claimant is never exposed.
#[derive(Debug, Clone, Serialize)]
pub struct CouponView {
    pub id: i64,
    pub code: String,
    pub claimed: bool,
}

impl From<&Coupon> for CouponView {
    fn from(coupon: &Coupon) -> Self {
        Self {
            id: coupon.id.value(),
            code: coupon.code.clone(),
            claimed: coupon.is_claimed(),
        }
    }
}

/// Response for GET /api/available-coupons
#[derive(Debug, Clone, Serialize)]
pub struct AvailableCouponsResponse {
    pub coupons: Vec<CouponView>,
}

/// Response for GET /api/health
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
