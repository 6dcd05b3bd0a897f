//! In-memory adapters for machine status tracking.

mod repository;

pub use repository::InMemoryMachineRepository;
