//! JSON representations of machines.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::machine::domain::{Machine, MachineStatus, StatusChange};

/// Wire shape of a machine with its ascending status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineView {
    /// Zero-padded machine identifier.
    pub id: String,
    /// Status changes ordered by start time.
    pub status_changes: Vec<StatusChangeView>,
    /// Status of the latest change.
    pub current_status: MachineStatus,
}

/// Wire shape of a single status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeView {
    /// Status entered.
    pub status: MachineStatus,
    /// ISO-8601 local time without offset, second precision.
    pub start_time: NaiveDateTime,
}

/// Optional body of `POST /api/generate_machines`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateMachinesRequest {
    /// Fleet size to top up to.
    #[serde(default)]
    pub count: Option<usize>,
}

impl From<&StatusChange> for StatusChangeView {
    fn from(change: &StatusChange) -> Self {
        Self {
            status: change.status(),
            start_time: change.start_time(),
        }
    }
}

impl From<&Machine> for MachineView {
    fn from(machine: &Machine) -> Self {
        Self {
            id: machine.id().to_string(),
            status_changes: machine.history().iter().map(StatusChangeView::from).collect(),
            current_status: machine.current_status(),
        }
    }
}
