//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Client address derivation from proxy headers
//! - Cookie building and parsing
//! - Token cryptography (random bytes, base64url, HMAC-SHA256)
//! - Wall clock abstraction

pub mod client;
pub mod clock;
pub mod cookie;
pub mod crypto;
