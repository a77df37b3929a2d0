//! Coupon Router

use crate::application::config::CouponConfig;
use crate::domain::repository::CouponRepository;
use crate::infra::cooldown::CooldownTracker;
use crate::infra::postgres::PgCouponRepository;
use crate::presentation::handlers::{self, CouponAppState};
use axum::{Router, routing::get};
use platform::clock::{Clock, SystemClock};
use std::sync::Arc;

/// Create the coupon router with PostgreSQL repository and the system clock
pub fn coupon_router(
    repo: PgCouponRepository,
    cooldowns: Arc<CooldownTracker>,
    config: CouponConfig,
) -> Router {
    coupon_router_generic(repo, cooldowns, Arc::new(SystemClock), config)
}

/// Create a coupon router for any repository implementation and clock
pub fn coupon_router_generic<R>(
    repo: R,
    cooldowns: Arc<CooldownTracker>,
    clock: Arc<dyn Clock>,
    config: CouponConfig,
) -> Router
where
    R: CouponRepository + Send + Sync + 'static,
{
    let state = CouponAppState {
        repo: Arc::new(repo),
        cooldowns,
        clock,
        config: Arc::new(config),
    };

    Router::new()
        .route(
            "/claim",
            get(handlers::claim_coupon::<R>).post(handlers::claim_coupon::<R>),
        )
        .route("/available-coupons", get(handlers::list_available::<R>))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .with_state(state)
}
