//! In-memory repository for machine status tests and database-less runs.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::machine::{
    domain::{Machine, MachineId},
    ports::{
        FleetChanges, FleetReconciler, MachineRepository, MachineRepositoryError,
        MachineRepositoryResult,
    },
};

/// Thread-safe in-memory machine repository.
///
/// Each operation holds a single lock for its whole duration, which gives the
/// same all-or-nothing visibility as a database transaction.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMachineRepository {
    state: Arc<RwLock<BTreeMap<MachineId, Machine>>>,
}

impl InMemoryMachineRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> MachineRepositoryResult<RwLockReadGuard<'_, BTreeMap<MachineId, Machine>>> {
        self.state.read().map_err(|err| {
            MachineRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(
        &self,
    ) -> MachineRepositoryResult<RwLockWriteGuard<'_, BTreeMap<MachineId, Machine>>> {
        self.state.write().map_err(|err| {
            MachineRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Applies reconciliation writes to a copy of the fleet.
///
/// Works on a clone so a rejected change leaves the stored fleet untouched.
fn apply_changes(
    fleet: &BTreeMap<MachineId, Machine>,
    changes: FleetChanges,
) -> MachineRepositoryResult<BTreeMap<MachineId, Machine>> {
    let mut next = fleet.clone();
    for appended in changes.appended {
        let machine = next
            .get_mut(&appended.machine_id)
            .ok_or_else(|| MachineRepositoryError::NotFound(appended.machine_id.clone()))?;
        machine.record_status_change(appended.change);
    }
    for machine in changes.created {
        if next.contains_key(machine.id()) {
            return Err(MachineRepositoryError::DuplicateMachine(machine.id().clone()));
        }
        next.insert(machine.id().clone(), machine);
    }
    Ok(next)
}

#[async_trait]
impl MachineRepository for InMemoryMachineRepository {
    async fn list_all(&self) -> MachineRepositoryResult<Vec<Machine>> {
        let state = self.read()?;
        Ok(state.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &MachineId) -> MachineRepositoryResult<Option<Machine>> {
        let state = self.read()?;
        Ok(state.get(id).cloned())
    }

    async fn delete(&self, id: &MachineId) -> MachineRepositoryResult<bool> {
        let mut state = self.write()?;
        Ok(state.remove(id).is_some())
    }

    async fn store_all(&self, machines: &[Machine]) -> MachineRepositoryResult<()> {
        let mut state = self.write()?;
        let changes = FleetChanges {
            appended: Vec::new(),
            created: machines.to_vec(),
        };
        let next = apply_changes(&state, changes)?;
        *state = next;
        Ok(())
    }

    async fn reconcile(&self, reconciler: FleetReconciler) -> MachineRepositoryResult<Vec<Machine>> {
        let mut state = self.write()?;
        let changes = reconciler(state.values().cloned().collect())
            .map_err(MachineRepositoryError::Rejected)?;
        let next = apply_changes(&state, changes)?;
        *state = next;
        Ok(state.values().cloned().collect())
    }
}
