//! Machine status tracking.
//!
//! Machines carry a timestamped status history; a machine's current status
//! is always the status of its latest change. The module also generates
//! plausible random history for demos and reconciles the fleet by appending
//! fresh status changes. It follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
