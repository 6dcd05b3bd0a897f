//! Unit tests for machine status tracking.


use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use mockable::Clock;

/// Clock pinned to a fixed local wall-clock time.
#[derive(Debug, Clone, Copy)]
pub(super) struct FixedClock(DateTime<Local>);

impl FixedClock {
    pub(super) fn at(naive: NaiveDateTime) -> Self {
        let local = Local
            .from_local_datetime(&naive)
            .earliest()
            .expect("fixed test time should exist in the local timezone");
        Self(local)
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }
}

/// Builds a timestamp on 2026-10-19.
pub(super) fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .expect("test timestamp should be valid")
}
