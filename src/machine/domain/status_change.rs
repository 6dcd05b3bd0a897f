//! Timestamped status change records.

use super::MachineStatus;
use chrono::{NaiveDateTime, SubsecRound};

/// A machine entering a status at a given wall-clock time.
///
/// Timestamps carry second precision and no timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusChange {
    status: MachineStatus,
    start_time: NaiveDateTime,
}

impl StatusChange {
    /// Creates a status change, truncating `start_time` to whole seconds.
    #[must_use]
    pub fn new(status: MachineStatus, start_time: NaiveDateTime) -> Self {
        Self {
            status,
            start_time: start_time.trunc_subsecs(0),
        }
    }

    /// Returns the status entered.
    #[must_use]
    pub const fn status(&self) -> MachineStatus {
        self.status
    }

    /// Returns when the status was entered.
    #[must_use]
    pub const fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    /// Moves this change to `start_time`, keeping its status.
    pub(crate) fn anchor_at(&mut self, start_time: NaiveDateTime) {
        self.start_time = start_time.trunc_subsecs(0);
    }
}
