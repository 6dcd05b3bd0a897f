//! Repository port for machine persistence, lookup and reconciliation.

use crate::machine::domain::{
    Machine, MachineDomainError, MachineId, MachineStatus, StatusChange,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for machine repository operations.
pub type MachineRepositoryResult<T> = Result<T, MachineRepositoryError>;

/// Pure reconciliation step run by [`MachineRepository::reconcile`].
///
/// Receives every stored machine in ascending id order and returns the
/// changes to apply. An error aborts the unit of work without writes.
pub type FleetReconciler =
    Box<dyn FnOnce(Vec<Machine>) -> Result<FleetChanges, MachineDomainError> + Send>;

/// A status change appended to an existing machine during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedStatusChange {
    /// Machine receiving the change.
    pub machine_id: MachineId,
    /// The appended change.
    pub change: StatusChange,
    /// Current status re-derived over the machine's whole history.
    pub current_status: MachineStatus,
}

/// Writes produced by a reconciliation step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FleetChanges {
    /// Status changes appended to existing machines.
    pub appended: Vec<AppendedStatusChange>,
    /// Newly generated machines with their initial history.
    pub created: Vec<Machine>,
}

/// Machine persistence contract.
///
/// Every method is one unit of work: it either applies completely or leaves
/// the store unchanged.
#[async_trait]
pub trait MachineRepository: Send + Sync {
    /// Returns every machine with its full history, ordered by id.
    async fn list_all(&self) -> MachineRepositoryResult<Vec<Machine>>;

    /// Finds a machine by identifier.
    ///
    /// Returns `None` when the machine does not exist.
    async fn find_by_id(&self, id: &MachineId) -> MachineRepositoryResult<Option<Machine>>;

    /// Deletes a machine and all of its status changes.
    ///
    /// Returns `false` when the machine did not exist.
    async fn delete(&self, id: &MachineId) -> MachineRepositoryResult<bool>;

    /// Stores a batch of new machines with their histories.
    ///
    /// # Errors
    ///
    /// Returns [`MachineRepositoryError::DuplicateMachine`] when any id is
    /// already taken; nothing from the batch is stored in that case.
    async fn store_all(&self, machines: &[Machine]) -> MachineRepositoryResult<()>;

    /// Loads the fleet, runs `reconciler` over it and applies the returned
    /// changes, returning the resulting fleet ordered by id.
    ///
    /// # Errors
    ///
    /// Returns [`MachineRepositoryError::Rejected`] when the reconciler
    /// fails, [`MachineRepositoryError::NotFound`] when an appended change
    /// targets a missing machine and
    /// [`MachineRepositoryError::DuplicateMachine`] when a created machine
    /// reuses an id. In every case no change is applied.
    async fn reconcile(&self, reconciler: FleetReconciler) -> MachineRepositoryResult<Vec<Machine>>;
}

/// Errors returned by machine repository implementations.
#[derive(Debug, Clone, Error)]
pub enum MachineRepositoryError {
    /// A machine with the same identifier already exists.
    #[error("duplicate machine identifier: {0}")]
    DuplicateMachine(MachineId),

    /// The machine was not found.
    #[error("machine not found: {0}")]
    NotFound(MachineId),

    /// The reconciliation step rejected the loaded fleet.
    #[error("reconciliation rejected: {0}")]
    Rejected(#[source] MachineDomainError),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl MachineRepositoryError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
