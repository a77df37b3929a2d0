//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Coupon, CooldownEntry)
//! - Domain value objects (CouponId, IdentitySignal, ClientToken, ...)
//! - Domain services (cooldown arithmetic, seed codes)
//! - Repository traits (interfaces)

pub mod entities;
pub mod repository;
pub mod services;
pub mod value_objects;
