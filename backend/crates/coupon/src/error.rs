//! Coupon Error Types
//!
//! This module provides coupon-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use crate::domain::services::ceil_secs;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use std::time::Duration;
use thiserror::Error;

/// Coupon-specific result type alias
pub type CouponResult<T> = Result<T, CouponError>;

/// Coupon-specific error variants
///
/// The first three are expected business outcomes shown to the user; the
/// rest are infrastructure failures that clients may retry.
#[derive(Debug, Error)]
pub enum CouponError {
    /// The client's network address claimed within the cooldown window
    #[error("Network cooldown active ({remaining:?} remaining)")]
    NetworkCooldown { remaining: Duration },

    /// The client's token claimed within the cooldown window
    #[error("Client cooldown active ({remaining:?} remaining)")]
    ClientCooldown { remaining: Duration },

    /// No unclaimed coupon left
    #[error("Coupon pool exhausted")]
    PoolExhausted,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store call exceeded its deadline
    #[error("Coupon store timed out")]
    StoreTimeout,

    /// Reservation kept losing races for candidate rows
    #[error("Reservation gave up after {attempts} contended attempts")]
    ReservationContention { attempts: u32 },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CouponError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CouponError::NetworkCooldown { .. } | CouponError::ClientCooldown { .. } => {
                ErrorKind::TooManyRequests
            }
            CouponError::PoolExhausted => ErrorKind::Gone,
            CouponError::Database(_)
            | CouponError::StoreTimeout
            | CouponError::ReservationContention { .. } => ErrorKind::ServiceUnavailable,
            CouponError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Cooldown time left, for cooldown rejections
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            CouponError::NetworkCooldown { remaining }
            | CouponError::ClientCooldown { remaining } => Some(*remaining),
            _ => None,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            CouponError::Database(e) => {
                tracing::error!(error = %e, "Coupon database error");
            }
            CouponError::StoreTimeout | CouponError::ReservationContention { .. } => {
                tracing::error!(error = %self, "Coupon store unavailable");
            }
            CouponError::Internal(msg) => {
                tracing::error!(message = %msg, "Coupon internal error");
            }
            CouponError::PoolExhausted => {
                tracing::info!("Claim rejected: pool exhausted");
            }
            CouponError::NetworkCooldown { remaining }
            | CouponError::ClientCooldown { remaining } => {
                tracing::debug!(
                    error = %self,
                    remaining_ms = remaining.as_millis() as u64,
                    "Claim rejected"
                );
            }
        }
    }
}

impl From<CouponError> for AppError {
    fn from(err: CouponError) -> Self {
        match err {
            CouponError::NetworkCooldown { remaining } => AppError::too_many_requests(format!(
                "Please wait {} seconds before claiming again.",
                ceil_secs(remaining)
            ))
            .with_retry_after(remaining),
            CouponError::ClientCooldown { remaining } => AppError::too_many_requests(format!(
                "This browser has already claimed a coupon. Please wait {} seconds.",
                ceil_secs(remaining)
            ))
            .with_retry_after(remaining),
            CouponError::PoolExhausted => AppError::gone("All coupons have been claimed!"),
            CouponError::Database(e) => {
                AppError::service_unavailable("Coupon service is temporarily unavailable.")
                    .with_action("Please try again shortly.")
                    .with_source(e)
            }
            err @ (CouponError::StoreTimeout | CouponError::ReservationContention { .. }) => {
                AppError::service_unavailable("Coupon service is temporarily unavailable.")
                    .with_action("Please try again shortly.")
                    .with_source(err)
            }
            err @ CouponError::Internal(_) => {
                AppError::internal("Something went wrong.").with_source(err)
            }
        }
    }
}

impl IntoResponse for CouponError {
    fn into_response(self) -> Response {
        self.log();
        AppError::from(self).into_response()
    }
}
