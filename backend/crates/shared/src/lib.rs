//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of vocabulary shared by every
//! backend crate:
//! - The unified error type and result alias
//! - The error classification that maps onto HTTP status codes
//! - The HTTP rendering of errors (feature `axum`)

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
