//! Adapter implementations for machine persistence.
//!
//! - [`memory`]: lock-guarded in-memory store
//! - [`postgres`]: Diesel-backed `PostgreSQL` store

pub mod memory;
pub mod postgres;
