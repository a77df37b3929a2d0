//! Infrastructure Layer
//!
//! Store implementations and process-local state.

pub mod cooldown;
pub mod memory;
pub mod postgres;
