//! Machine aggregate root.

use super::{MachineDomainError, MachineId, MachineStatus, StatusChange};

/// A tracked machine with its full status history.
///
/// The history is kept in ascending `start_time` order. Changes sharing a
/// timestamp stay in insertion order, so the most recently recorded of them
/// counts as the latest. `current_status` is always the status of the latest
/// change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    id: MachineId,
    history: Vec<StatusChange>,
    current_status: MachineStatus,
}

/// Parameter object for reconstructing a persisted machine aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedMachineData {
    /// Persisted machine identifier.
    pub id: MachineId,
    /// Status cached in the machine row.
    pub current_status: MachineStatus,
    /// Persisted status changes in storage order.
    pub history: Vec<StatusChange>,
}

impl Machine {
    /// Creates a machine from an initial status history.
    ///
    /// # Errors
    ///
    /// Returns [`MachineDomainError::EmptyHistory`] when `history` is empty.
    pub fn new(id: MachineId, history: Vec<StatusChange>) -> Result<Self, MachineDomainError> {
        let mut ordered = history;
        ordered.sort_by_key(StatusChange::start_time);
        let current_status = latest_status(&ordered)
            .ok_or_else(|| MachineDomainError::EmptyHistory(id.to_string()))?;
        Ok(Self {
            id,
            history: ordered,
            current_status,
        })
    }

    /// Reconstructs a machine from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns [`MachineDomainError::EmptyHistory`] when no status changes
    /// were stored, or [`MachineDomainError::InconsistentCurrentStatus`] when
    /// the cached status disagrees with the latest stored change.
    pub fn from_persisted(data: PersistedMachineData) -> Result<Self, MachineDomainError> {
        let PersistedMachineData {
            id,
            current_status: stored,
            history,
        } = data;
        let machine = Self::new(id, history)?;
        if machine.current_status != stored {
            return Err(MachineDomainError::InconsistentCurrentStatus {
                machine_id: machine.id.to_string(),
                stored: stored.to_string(),
                derived: machine.current_status.to_string(),
            });
        }
        Ok(machine)
    }

    /// Returns the machine identifier.
    #[must_use]
    pub const fn id(&self) -> &MachineId {
        &self.id
    }

    /// Returns the status history in ascending chronological order.
    #[must_use]
    pub fn history(&self) -> &[StatusChange] {
        &self.history
    }

    /// Returns the status of the latest status change.
    #[must_use]
    pub const fn current_status(&self) -> MachineStatus {
        self.current_status
    }

    /// Appends a status change and re-derives the current status from the
    /// whole history.
    ///
    /// Returns the resulting current status, which is not necessarily the
    /// status just recorded when older history carries later timestamps.
    pub fn record_status_change(&mut self, change: StatusChange) -> MachineStatus {
        self.history.push(change);
        self.history.sort_by_key(StatusChange::start_time);
        if let Some(status) = latest_status(&self.history) {
            self.current_status = status;
        }
        self.current_status
    }
}

/// Returns the status of the change with the greatest start time.
///
/// `max_by_key` yields the last of equal maxima, which is the most recently
/// inserted one after a stable sort.
fn latest_status(history: &[StatusChange]) -> Option<MachineStatus> {
    history
        .iter()
        .max_by_key(|change| change.start_time())
        .map(StatusChange::status)
}
