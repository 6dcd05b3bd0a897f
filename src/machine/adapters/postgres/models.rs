//! Diesel row models for machine status persistence.

use super::schema::{machines, status_changes};
use chrono::NaiveDateTime;
use diesel::prelude::*;

/// Query result row for machine records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = machines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MachineRow {
    /// Machine identifier.
    pub id: String,
    /// Cached current status label.
    pub current_status: String,
}

/// Insert model for machine records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = machines)]
pub struct NewMachineRow {
    /// Machine identifier.
    pub id: String,
    /// Cached current status label.
    pub current_status: String,
}

/// Query result row for status change records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = status_changes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StatusChangeRow {
    /// Owning machine identifier.
    pub machine_id: String,
    /// Status label.
    pub status: String,
    /// Status start time.
    pub start_time: NaiveDateTime,
}

/// Insert model for status change records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = status_changes)]
pub struct NewStatusChangeRow {
    /// Owning machine identifier.
    pub machine_id: String,
    /// Status label.
    pub status: String,
    /// Status start time.
    pub start_time: NaiveDateTime,
}
