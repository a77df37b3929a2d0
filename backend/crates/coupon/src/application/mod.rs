//! Application Layer - Use Cases
//!
//! This layer orchestrates domain logic and infrastructure.
//! Contains use case implementations.

pub mod claim_coupon;
pub mod client_token;
pub mod config;
pub mod list_coupons;
