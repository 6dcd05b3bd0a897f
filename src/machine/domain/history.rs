//! Synthetic status history generation.
//!
//! Produces a plausible, time-ordered sequence of status changes covering one
//! day for demos. Generation is pure: persistence is the caller's concern.

use super::{Machine, MachineDomainError, MachineId, MachineStatus, StatusChange};
use chrono::{NaiveDateTime, NaiveTime, SubsecRound, TimeDelta};
use rand::Rng;
use rand::distributions::Standard;

/// Inclusive time window that generated timestamps are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl HistoryWindow {
    /// Creates a window, truncating both bounds to whole seconds.
    ///
    /// # Errors
    ///
    /// Returns [`MachineDomainError::InvertedWindow`] when `end` precedes
    /// `start`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, MachineDomainError> {
        let start_secs = start.trunc_subsecs(0);
        let end_secs = end.trunc_subsecs(0);
        if end_secs < start_secs {
            return Err(MachineDomainError::InvertedWindow {
                start: start_secs,
                end: end_secs,
            });
        }
        Ok(Self {
            start: start_secs,
            end: end_secs,
        })
    }

    /// Window from midnight of `now`'s date up to `now`.
    #[must_use]
    pub fn for_day(now: NaiveDateTime) -> Self {
        Self {
            start: now.date().and_time(NaiveTime::MIN),
            end: now.trunc_subsecs(0),
        }
    }

    /// Returns the window start, which anchors every generated history.
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Returns the inclusive window end.
    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }
}

/// Inclusive bounds on how many status changes are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeCountRange {
    min: usize,
    max: usize,
}

impl ChangeCountRange {
    /// Creates a count range.
    ///
    /// # Errors
    ///
    /// Returns [`MachineDomainError::InvalidCountRange`] when `min > max`.
    pub const fn new(min: usize, max: usize) -> Result<Self, MachineDomainError> {
        if min > max {
            return Err(MachineDomainError::InvalidCountRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Returns the lower bound.
    #[must_use]
    pub const fn min(&self) -> usize {
        self.min
    }

    /// Returns the upper bound.
    #[must_use]
    pub const fn max(&self) -> usize {
        self.max
    }
}

impl Default for ChangeCountRange {
    fn default() -> Self {
        Self { min: 1, max: 7 }
    }
}

/// Output of [`generate_history`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedHistory {
    /// Non-empty status changes in ascending `start_time` order.
    pub changes: Vec<StatusChange>,
    /// Status of the last change.
    pub final_status: MachineStatus,
}

/// Generates a random status history inside `window`.
///
/// Draws a change count uniformly from `counts`, then that many independent
/// `(status, timestamp)` pairs, sorts them by timestamp and overwrites the
/// earliest timestamp with the window start so the history covers the whole
/// window. A zero count yields a single change at the window start.
pub fn generate_history<R>(
    rng: &mut R,
    window: HistoryWindow,
    counts: ChangeCountRange,
) -> GeneratedHistory
where
    R: Rng + ?Sized,
{
    let count = rng.gen_range(counts.min()..=counts.max());
    let span_secs = (window.end() - window.start()).num_seconds();

    let mut changes: Vec<StatusChange> = (0..count)
        .map(|_| {
            let status: MachineStatus = rng.sample(Standard);
            let offset = TimeDelta::seconds(rng.gen_range(0..=span_secs));
            StatusChange::new(status, window.start() + offset)
        })
        .collect();
    changes.sort_by_key(StatusChange::start_time);

    if let Some(first) = changes.first_mut() {
        first.anchor_at(window.start());
    }

    let Some(last) = changes.last() else {
        let status: MachineStatus = rng.sample(Standard);
        return GeneratedHistory {
            changes: vec![StatusChange::new(status, window.start())],
            final_status: status,
        };
    };
    let final_status = last.status();

    GeneratedHistory {
        changes,
        final_status,
    }
}

/// Generates a machine with sequence id `sequence` and a random history.
///
/// # Errors
///
/// Returns [`MachineDomainError::SequenceOutOfRange`] when `sequence` cannot
/// be rendered as a machine id.
pub fn generate_machine<R>(
    rng: &mut R,
    sequence: u32,
    window: HistoryWindow,
    counts: ChangeCountRange,
) -> Result<Machine, MachineDomainError>
where
    R: Rng + ?Sized,
{
    let id = MachineId::from_sequence(sequence)?;
    let GeneratedHistory { changes, .. } = generate_history(rng, window, counts);
    Machine::new(id, changes)
}
