//! Diesel schema for machine status persistence.

diesel::table! {
    /// Tracked machines with their cached current status.
    machines (id) {
        /// Zero-padded machine sequence identifier.
        #[max_length = 4]
        id -> Varchar,
        /// Status of the latest status change.
        #[max_length = 50]
        current_status -> Varchar,
    }
}

diesel::table! {
    /// Status history rows, one per status change.
    status_changes (id) {
        /// Insertion sequence; breaks ties between equal start times.
        id -> Int8,
        /// Owning machine.
        #[max_length = 4]
        machine_id -> Varchar,
        /// Status entered.
        #[max_length = 50]
        status -> Varchar,
        /// When the status was entered, second precision, no timezone.
        start_time -> Timestamp,
    }
}

diesel::joinable!(status_changes -> machines (machine_id));
diesel::allow_tables_to_appear_in_same_query!(machines, status_changes);
