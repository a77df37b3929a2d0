//! Coupon Distribution Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, cooldown arithmetic, repository trait
//! - `application/` - Claim and listing use cases, client tokens, config
//! - `infra/` - PostgreSQL and in-memory code pools, cooldown tracker
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Allocation Model
//! - Each coupon is handed out at most once; reservation is a single atomic
//!   conditional update against the store, lowest id first
//! - A client is gated by two independent identity signals: its network
//!   address and a signed token kept in an HttpOnly cookie
//! - Cooldowns are recorded only after a successful reservation and live in
//!   process memory (they reset on restart)

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::CouponConfig;
pub use error::{CouponError, CouponResult};
pub use infra::cooldown::CooldownTracker;
pub use infra::memory::InMemoryCouponRepository;
pub use infra::postgres::PgCouponRepository;
pub use presentation::router::{coupon_router, coupon_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
