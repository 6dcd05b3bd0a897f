//! Domain model for machine status tracking.
//!
//! The machine domain models machines, their timestamped status history and
//! the synthetic history generator while keeping all infrastructure concerns
//! outside of the domain boundary.

mod error;
pub mod history;
mod ids;
mod machine;
mod status;
mod status_change;

pub use error::{MachineDomainError, ParseMachineStatusError};
pub use history::{
    ChangeCountRange, GeneratedHistory, HistoryWindow, generate_history, generate_machine,
};
pub use ids::MachineId;
pub use machine::{Machine, PersistedMachineData};
pub use status::MachineStatus;
pub use status_change::StatusChange;
