//! Machine status vocabulary.

use super::ParseMachineStatusError;
use rand::Rng;
use rand::distributions::{Distribution, Standard};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operational status a machine can enter.
///
/// The serialized labels are the shop-floor vocabulary used by operators and
/// must be preserved verbatim in storage and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineStatus {
    /// The machine is producing parts.
    #[serde(rename = "生產")]
    Production,
    /// The machine is powered but idle.
    #[serde(rename = "閒置")]
    Idle,
    /// The machine is down.
    #[serde(rename = "當機")]
    Down,
    /// The machine is being installed or set up.
    #[serde(rename = "裝機")]
    Installing,
    /// The machine is on loan to engineering.
    #[serde(rename = "工程借機")]
    EngineeringLoan,
    /// Any other condition.
    #[serde(rename = "其他")]
    Other,
}

impl MachineStatus {
    /// Every status, in vocabulary order.
    pub const ALL: [Self; 6] = [
        Self::Production,
        Self::Idle,
        Self::Down,
        Self::Installing,
        Self::EngineeringLoan,
        Self::Other,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Production => "生產",
            Self::Idle => "閒置",
            Self::Down => "當機",
            Self::Installing => "裝機",
            Self::EngineeringLoan => "工程借機",
            Self::Other => "其他",
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MachineStatus {
    type Error = ParseMachineStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == trimmed)
            .ok_or_else(|| ParseMachineStatusError(value.to_owned()))
    }
}

/// Draws a status uniformly from the vocabulary.
impl Distribution<MachineStatus> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> MachineStatus {
        match rng.gen_range(0..6_u8) {
            0 => MachineStatus::Production,
            1 => MachineStatus::Idle,
            2 => MachineStatus::Down,
            3 => MachineStatus::Installing,
            4 => MachineStatus::EngineeringLoan,
            _ => MachineStatus::Other,
        }
    }
}
