//! Port contracts for machine status tracking.
//!
//! Ports define infrastructure-agnostic interfaces used by machine services.

pub mod repository;

pub use repository::{
    AppendedStatusChange, FleetChanges, FleetReconciler, MachineRepository,
    MachineRepositoryError, MachineRepositoryResult,
};
