//! In-memory coupon pool
//!
//! Same contract as the PostgreSQL repository, for tests and for running the
//! service without a database. The whole pool sits behind one async mutex,
//! so every reservation is trivially a single atomic step.

use crate::domain::entities::Coupon;
use crate::domain::repository::CouponRepository;
use crate::domain::value_objects::{CouponId, Reservation};
use crate::error::CouponResult;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct InMemoryCouponRepository {
    coupons: Mutex<BTreeMap<CouponId, Coupon>>,
}

impl InMemoryCouponRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool holding `codes`, ids assigned from 1 in order
    pub fn with_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let coupons = codes
            .into_iter()
            .enumerate()
            .map(|(i, code)| {
                let id = CouponId::new(i as i64 + 1);
                (id, Coupon::new(id, code))
            })
            .collect();
        Self {
            coupons: Mutex::new(coupons),
        }
    }

    /// Every coupon, claimed or not, ascending by id
    pub async fn snapshot(&self) -> Vec<Coupon> {
        self.coupons.lock().await.values().cloned().collect()
    }
}

impl CouponRepository for InMemoryCouponRepository {
    async fn reserve_next(&self, claimant: &str) -> CouponResult<Reservation> {
        let mut coupons = self.coupons.lock().await;

        let Some(coupon) = coupons.values_mut().find(|c| !c.is_claimed()) else {
            return Ok(Reservation::Exhausted);
        };
        coupon.claim(claimant, Utc::now());

        tracing::info!(coupon_id = %coupon.id, code = %coupon.code, "Coupon reserved");
        Ok(Reservation::Claimed(coupon.clone()))
    }

    async fn list_unclaimed(&self) -> CouponResult<Vec<Coupon>> {
        let coupons = self.coupons.lock().await;
        Ok(coupons
            .values()
            .filter(|c| !c.is_claimed())
            .cloned()
            .collect())
    }

    async fn seed_if_empty(&self, codes: &[String]) -> CouponResult<u64> {
        let mut coupons = self.coupons.lock().await;
        if !coupons.is_empty() {
            return Ok(0);
        }

        for (i, code) in codes.iter().enumerate() {
            let id = CouponId::new(i as i64 + 1);
            coupons.insert(id, Coupon::new(id, code.clone()));
        }

        tracing::info!(seeded = codes.len(), "Seeded in-memory coupon pool");
        Ok(codes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reserve_lowest_id_first() {
        let repo = InMemoryCouponRepository::with_codes(["A", "B", "C"]);

        let Reservation::Claimed(first) = repo.reserve_next("10.0.0.1").await.unwrap() else {
            panic!("expected a coupon");
        };
        assert_eq!(first.id, CouponId::new(1));
        assert_eq!(first.code, "A");
        assert_eq!(first.claimed_by.as_deref(), Some("10.0.0.1"));
        assert!(first.claimed_at.is_some());

        let unclaimed = repo.list_unclaimed().await.unwrap();
        let codes: Vec<_> = unclaimed.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, ["B", "C"]);
    }

    #[tokio::test]
    async fn test_empty_pool_is_exhausted() {
        let repo = InMemoryCouponRepository::new();
        assert_eq!(
            repo.reserve_next("10.0.0.1").await.unwrap(),
            Reservation::Exhausted
        );
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let repo = InMemoryCouponRepository::new();
        let codes = vec!["COUPON1".to_string(), "COUPON2".to_string()];

        assert_eq!(repo.seed_if_empty(&codes).await.unwrap(), 2);
        assert_eq!(repo.seed_if_empty(&codes).await.unwrap(), 0);
        assert_eq!(repo.snapshot().await.len(), 2);
    }
}
