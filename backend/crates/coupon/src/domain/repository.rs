//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entities::Coupon;
use crate::domain::value_objects::Reservation;
use crate::error::CouponResult;

/// Coupon pool repository trait
///
/// Implementations own all claim state and must make `reserve_next` a single
/// indivisible step: two concurrent callers can never receive the same coupon.
#[trait_variant::make(CouponRepository: Send)]
pub trait LocalCouponRepository {
    /// Assign the lowest-id unclaimed coupon to `claimant`.
    /// Returns `Reservation::Exhausted` when none is left.
    async fn reserve_next(&self, claimant: &str) -> CouponResult<Reservation>;

    /// All unclaimed coupons, ascending by id
    async fn list_unclaimed(&self) -> CouponResult<Vec<Coupon>>;

    /// Insert `codes` in order if the pool holds no coupons at all.
    /// Returns the number of rows inserted.
    async fn seed_if_empty(&self, codes: &[String]) -> CouponResult<u64>;
}
