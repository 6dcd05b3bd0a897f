//! Application services for machine status tracking.

mod fleet;
pub mod reconcile;

pub use fleet::{
    DEFAULT_FLEET_SIZE, MAX_FLEET_SIZE, MachineFleetService, MachineFleetServiceError,
    MachineFleetServiceResult,
};
pub use reconcile::{RefreshPlan, plan_refresh};
