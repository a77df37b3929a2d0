//! HTTP Handlers

use crate::application::claim_coupon::{ClaimCouponInput, ClaimCouponUseCase};
use crate::application::config::CouponConfig;
use crate::application::list_coupons::ListAvailableCouponsUseCase;
use crate::domain::repository::CouponRepository;
use crate::domain::services::ceil_secs;
use crate::error::CouponResult;
use crate::infra::cooldown::CooldownTracker;
use crate::presentation::dto::{
    AvailableCouponsResponse, ClaimResponse, CouponView, HealthResponse,
};
use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, header};
use axum::response::IntoResponse;
use kernel::error::app_error::AppError;
use platform::client::extract_client_ip;
use platform::clock::Clock;
use platform::cookie::extract_cookie;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared state for coupon handlers
pub struct CouponAppState<R>
where
    R: CouponRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub cooldowns: Arc<CooldownTracker>,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<CouponConfig>,
}

// Manual impl: derive would demand `R: Clone`
impl<R> Clone for CouponAppState<R>
where
    R: CouponRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            cooldowns: self.cooldowns.clone(),
            clock: self.clock.clone(),
            config: self.config.clone(),
        }
    }
}

/// GET|POST /api/claim
pub async fn claim_coupon<R>(
    State(state): State<CouponAppState<R>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> CouponResult<impl IntoResponse>
where
    R: CouponRepository + Send + Sync + 'static,
{
    let client_ip = extract_client_ip(&headers, addr.ip());
    let client_token = extract_cookie(&headers, &state.config.token_cookie_name);

    let use_case = ClaimCouponUseCase::new(
        state.repo.clone(),
        state.cooldowns.clone(),
        state.clock.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(ClaimCouponInput {
            client_ip,
            client_token,
        })
        .await?;

    let cookie = state
        .config
        .token_cookie()
        .build_set_cookie(output.client_token.as_str());

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(ClaimResponse {
            message: format!("You've claimed: {}", output.coupon.code),
            code: output.coupon.code,
            cooldown_secs: ceil_secs(state.config.cooldown_window),
        }),
    ))
}

/// GET /api/available-coupons
pub async fn list_available<R>(
    State(state): State<CouponAppState<R>>,
) -> CouponResult<Json<AvailableCouponsResponse>>
where
    R: CouponRepository + Send + Sync + 'static,
{
    let use_case = ListAvailableCouponsUseCase::new(state.repo.clone(), state.config.clone());
    let coupons = use_case.execute().await?;

    Ok(Json(AvailableCouponsResponse {
        coupons: coupons.iter().map(CouponView::from).collect(),
    }))
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Unknown routes
pub async fn not_found() -> AppError {
    AppError::not_found("No such endpoint.")
}
