//! Error types for machine domain validation and parsing.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Errors returned while constructing machine domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineDomainError {
    /// The machine identifier is not a zero-padded sequence number.
    #[error("invalid machine id '{0}', expected four digits from 0001 to 9999")]
    InvalidMachineId(String),

    /// The sequence number cannot be rendered as a machine identifier.
    #[error("machine sequence {0} is outside 1..=9999")]
    SequenceOutOfRange(u32),

    /// A machine must own at least one status change.
    #[error("machine {0} has no status history")]
    EmptyHistory(String),

    /// The stored current status disagrees with the status history.
    #[error("machine {machine_id} stores current status {stored} but its latest change is {derived}")]
    InconsistentCurrentStatus {
        /// Machine whose row is inconsistent.
        machine_id: String,
        /// Status found in the machine row.
        stored: String,
        /// Status of the latest status change.
        derived: String,
    },

    /// The generation window ends before it starts.
    #[error("history window ends at {end} before it starts at {start}")]
    InvertedWindow {
        /// Requested window start.
        start: NaiveDateTime,
        /// Requested window end.
        end: NaiveDateTime,
    },

    /// The change count range is empty.
    #[error("change count range {min}..={max} is empty")]
    InvalidCountRange {
        /// Requested lower bound.
        min: usize,
        /// Requested upper bound.
        max: usize,
    },
}

/// Error returned while parsing machine statuses from persistence or input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown machine status: {0}")]
pub struct ParseMachineStatusError(pub String);
