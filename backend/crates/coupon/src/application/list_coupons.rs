//! List Available Coupons Use Case

use crate::application::config::CouponConfig;
use crate::domain::entities::Coupon;
use crate::domain::repository::CouponRepository;
use crate::error::{CouponError, CouponResult};
use std::sync::Arc;

/// List Available Coupons Use Case
pub struct ListAvailableCouponsUseCase<R>
where
    R: CouponRepository,
{
    coupon_repo: Arc<R>,
    config: Arc<CouponConfig>,
}

impl<R> ListAvailableCouponsUseCase<R>
where
    R: CouponRepository,
{
    pub fn new(coupon_repo: Arc<R>, config: Arc<CouponConfig>) -> Self {
        Self {
            coupon_repo,
            config,
        }
    }

    /// Unclaimed coupons, ascending by id. May lag behind concurrent claims.
    pub async fn execute(&self) -> CouponResult<Vec<Coupon>> {
        let coupons = tokio::time::timeout(
            self.config.store_timeout,
            self.coupon_repo.list_unclaimed(),
        )
        .await
        .map_err(|_| CouponError::StoreTimeout)??;

        tracing::debug!(available = coupons.len(), "Listed available coupons");
        Ok(coupons)
    }
}
