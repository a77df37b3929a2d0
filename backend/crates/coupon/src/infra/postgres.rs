//! PostgreSQL Repository Implementation

use crate::domain::entities::Coupon;
use crate::domain::repository::CouponRepository;
use crate::domain::value_objects::{CouponId, Reservation};
use crate::error::{CouponError, CouponResult};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::time::Duration;

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const RETRY_BACKOFF: Duration = Duration::from_millis(5);

/// Picks the lowest unclaimed row and claims it in one statement. Rows locked
/// by a concurrent reservation are skipped, and the outer `claimed_by IS NULL`
/// re-check guarantees a row is never claimed twice.
const RESERVE_NEXT_SQL: &str = r#"
    UPDATE coupons
    SET claimed_by = $1, claimed_at = now()
    WHERE coupon_id = (
        SELECT coupon_id
        FROM coupons
        WHERE claimed_by IS NULL
        ORDER BY coupon_id
        LIMIT 1
        FOR UPDATE SKIP LOCKED
    )
    AND claimed_by IS NULL
    RETURNING coupon_id, code, claimed_by, claimed_at
"#;

/// PostgreSQL-backed coupon pool
#[derive(Clone)]
pub struct PgCouponRepository {
    pool: PgPool,
    max_attempts: u32,
}

impl PgCouponRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Bound on reservation retries when candidate rows keep being taken
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    async fn claim_once(&self, claimant: &str) -> CouponResult<Option<Coupon>> {
        let row = sqlx::query_as::<_, CouponRow>(RESERVE_NEXT_SQL)
            .bind(claimant)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(CouponRow::into_coupon))
    }

    async fn any_unclaimed(&self) -> CouponResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM coupons WHERE claimed_by IS NULL)",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}

impl CouponRepository for PgCouponRepository {
    async fn reserve_next(&self, claimant: &str) -> CouponResult<Reservation> {
        reserve_with_retry(
            self.max_attempts,
            move || self.claim_once(claimant),
            move || self.any_unclaimed(),
        )
        .await
    }

    async fn list_unclaimed(&self) -> CouponResult<Vec<Coupon>> {
        let rows = sqlx::query_as::<_, CouponRow>(
            r#"
            SELECT
                coupon_id,
                code,
                claimed_by,
                claimed_at
            FROM coupons
            WHERE claimed_by IS NULL
            ORDER BY coupon_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CouponRow::into_coupon).collect())
    }

    async fn seed_if_empty(&self, codes: &[String]) -> CouponResult<u64> {
        let mut tx = self.pool.begin().await?;

        // Serializes concurrent seeders (several instances starting at once)
        // while still allowing reads.
        sqlx::query("LOCK TABLE coupons IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM coupons")
            .fetch_one(&mut *tx)
            .await?;

        if existing > 0 {
            tx.commit().await?;
            tracing::info!(existing, "Coupon pool already populated, skipping seed");
            return Ok(0);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO coupons (code)
            SELECT code
            FROM UNNEST($1::TEXT[]) WITH ORDINALITY AS seed(code, ord)
            ORDER BY ord
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(codes)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        tracing::info!(inserted, "Seeded coupon pool");
        Ok(inserted)
    }
}

/// Runs `claim_once` until it yields a coupon, the pool turns out to be
/// empty, or `max_attempts` is spent.
///
/// Zero rows from the claim statement means either nothing is left or every
/// remaining row is locked by an in-flight reservation; `any_unclaimed`
/// tells the two apart.
async fn reserve_with_retry<C, CF, U, UF>(
    max_attempts: u32,
    mut claim_once: C,
    mut any_unclaimed: U,
) -> CouponResult<Reservation>
where
    C: FnMut() -> CF,
    CF: Future<Output = CouponResult<Option<Coupon>>>,
    U: FnMut() -> UF,
    UF: Future<Output = CouponResult<bool>>,
{
    for attempt in 1..=max_attempts {
        if let Some(coupon) = claim_once().await? {
            tracing::info!(
                coupon_id = %coupon.id,
                code = %coupon.code,
                attempt,
                "Coupon reserved"
            );
            return Ok(Reservation::Claimed(coupon));
        }

        if !any_unclaimed().await? {
            return Ok(Reservation::Exhausted);
        }

        tracing::debug!(attempt, "Candidate coupons contended, retrying");
        tokio::time::sleep(RETRY_BACKOFF * attempt).await;
    }

    tracing::warn!(attempts = max_attempts, "Reservation retries exhausted");
    Err(CouponError::ReservationContention {
        attempts: max_attempts,
    })
}

// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct CouponRow {
    coupon_id: i64,
    code: String,
    claimed_by: Option<String>,
    claimed_at: Option<DateTime<Utc>>,
}

impl CouponRow {
    fn into_coupon(self) -> Coupon {
        Coupon {
            id: CouponId::new(self.coupon_id),
            code: self.code,
            claimed_by: self.claimed_by,
            claimed_at: self.claimed_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::future::ready;

    #[tokio::test]
    async fn test_contention_gives_up_after_max_attempts() {
        let claims = Cell::new(0);

        let result = reserve_with_retry(
            3,
            || {
                claims.set(claims.get() + 1);
                ready(Ok(None))
            },
            || ready(Ok(true)),
        )
        .await;

        assert!(matches!(
            result,
            Err(CouponError::ReservationContention { attempts: 3 })
        ));
        assert_eq!(claims.get(), 3);
    }

    #[tokio::test]
    async fn test_empty_pool_stops_without_retry() {
        let claims = Cell::new(0);

        let result = reserve_with_retry(
            5,
            || {
                claims.set(claims.get() + 1);
                ready(Ok(None))
            },
            || ready(Ok(false)),
        )
        .await;

        assert_eq!(result.unwrap(), Reservation::Exhausted);
        assert_eq!(claims.get(), 1);
    }

    #[tokio::test]
    async fn test_row_freed_on_retry_is_claimed() {
        let claims = Cell::new(0);
        let coupon = Coupon::new(CouponId::new(4), "COUPON4");

        let result = reserve_with_retry(
            5,
            || {
                let n = claims.get() + 1;
                claims.set(n);
                ready(Ok((n == 2).then(|| coupon.clone())))
            },
            || ready(Ok(true)),
        )
        .await;

        assert_eq!(result.unwrap(), Reservation::Claimed(coupon));
        assert_eq!(claims.get(), 2);
    }

    #[tokio::test]
    async fn test_store_error_is_not_retried() {
        let claims = Cell::new(0);

        let result = reserve_with_retry(
            5,
            || {
                claims.set(claims.get() + 1);
                ready(Err(CouponError::Database(sqlx::Error::PoolTimedOut)))
            },
            || ready(Ok(true)),
        )
        .await;

        assert!(matches!(result, Err(CouponError::Database(_))));
        assert_eq!(claims.get(), 1);
    }
}
