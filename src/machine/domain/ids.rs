//! Identifier types for the machine domain.

use super::MachineDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Externally meaningful machine identifier.
///
/// Identifiers are sequence numbers rendered as exactly four zero-padded
/// digits, for example `0001`, so lexical order matches sequence order.
/// Callers address machines by this value, so it doubles as the primary key
/// in storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MachineId(String);

impl MachineId {
    /// Rendered width of a machine identifier.
    pub const WIDTH: usize = 4;

    /// Largest sequence number that fits in [`Self::WIDTH`] digits.
    pub const MAX_SEQUENCE: u32 = 9999;

    /// Creates a validated machine identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MachineDomainError::InvalidMachineId`] when the value is not
    /// exactly [`Self::WIDTH`] ASCII digits or encodes sequence zero.
    pub fn new(value: impl Into<String>) -> Result<Self, MachineDomainError> {
        let raw = value.into();
        let is_valid = raw.len() == Self::WIDTH
            && raw.bytes().all(|byte| byte.is_ascii_digit())
            && raw.bytes().any(|byte| byte != b'0');
        if !is_valid {
            return Err(MachineDomainError::InvalidMachineId(raw));
        }
        Ok(Self(raw))
    }

    /// Renders a sequence number as a zero-padded identifier.
    ///
    /// # Errors
    ///
    /// Returns [`MachineDomainError::SequenceOutOfRange`] for `0` or values
    /// above [`Self::MAX_SEQUENCE`].
    pub fn from_sequence(sequence: u32) -> Result<Self, MachineDomainError> {
        if sequence == 0 || sequence > Self::MAX_SEQUENCE {
            return Err(MachineDomainError::SequenceOutOfRange(sequence));
        }
        Ok(Self(format!("{sequence:0width$}", width = Self::WIDTH)))
    }

    /// Returns the numeric sequence this identifier encodes.
    #[must_use]
    pub fn sequence(&self) -> u32 {
        self.0
            .bytes()
            .fold(0, |acc, digit| acc * 10 + u32::from(digit - b'0'))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MachineId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MachineId {
    type Error = MachineDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MachineId> for String {
    fn from(value: MachineId) -> Self {
        value.0
    }
}
