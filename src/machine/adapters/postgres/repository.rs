//! `PostgreSQL` repository implementation for machine status storage.

use super::{
    models::{MachineRow, NewMachineRow, NewStatusChangeRow, StatusChangeRow},
    schema::{machines, status_changes},
};
use crate::machine::{
    domain::{Machine, MachineId, MachineStatus, PersistedMachineData, StatusChange},
    ports::{
        AppendedStatusChange, FleetChanges, FleetReconciler, MachineRepository,
        MachineRepositoryError, MachineRepositoryResult,
    },
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;

/// SQL creating the machine tables; safe to apply repeatedly.
pub const CREATE_SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-10-01-000000_create_machine_tables/up.sql");

/// Rows per multi-row `INSERT`, kept well under the `PostgreSQL` bind
/// parameter limit.
const INSERT_CHUNK_ROWS: usize = 1000;

/// `PostgreSQL` connection pool type used by machine adapters.
pub type MachinePgPool = Pool<ConnectionManager<PgConnection>>;

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`MachineRepositoryError::Persistence`] when the pool cannot
/// establish its initial connections.
pub fn build_pool(database_url: &str, max_size: u32) -> MachineRepositoryResult<MachinePgPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(MachineRepositoryError::persistence)
}

/// `PostgreSQL`-backed machine repository.
#[derive(Debug, Clone)]
pub struct PostgresMachineRepository {
    pool: MachinePgPool,
}

impl PostgresMachineRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: MachinePgPool) -> Self {
        Self { pool }
    }

    /// Creates the machine tables when they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`MachineRepositoryError::Persistence`] when the schema SQL
    /// fails.
    pub async fn ensure_schema(&self) -> MachineRepositoryResult<()> {
        self.run_in_transaction(|connection| {
            connection
                .batch_execute(CREATE_SCHEMA_SQL)
                .map_err(MachineRepositoryError::persistence)
        })
        .await
    }

    /// Runs `f` inside one transaction on a blocking worker thread.
    ///
    /// Any error returned by `f` rolls the whole transaction back.
    async fn run_in_transaction<F, T>(&self, f: F) -> MachineRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> MachineRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut pooled = pool.get().map_err(MachineRepositoryError::persistence)?;
            let connection: &mut PgConnection = &mut pooled;
            connection.transaction::<T, MachineRepositoryError, _>(f)
        })
        .await
        .map_err(MachineRepositoryError::persistence)?
    }

    /// Runs `f` inside one read-only `REPEATABLE READ` transaction.
    ///
    /// Every statement in `f` sees the same snapshot, so a machine row is
    /// never paired with history committed after it was read.
    async fn run_in_snapshot<F, T>(&self, f: F) -> MachineRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> MachineRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut pooled = pool.get().map_err(MachineRepositoryError::persistence)?;
            let connection: &mut PgConnection = &mut pooled;
            connection
                .build_transaction()
                .repeatable_read()
                .read_only()
                .run::<T, MachineRepositoryError, _>(f)
        })
        .await
        .map_err(MachineRepositoryError::persistence)?
    }
}

impl From<DieselError> for MachineRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl MachineRepository for PostgresMachineRepository {
    async fn list_all(&self) -> MachineRepositoryResult<Vec<Machine>> {
        self.run_in_snapshot(|connection| {
            let rows = machines::table
                .select(MachineRow::as_select())
                .order(machines::id.asc())
                .load::<MachineRow>(connection)?;
            load_fleet(connection, rows)
        })
        .await
    }

    async fn find_by_id(&self, id: &MachineId) -> MachineRepositoryResult<Option<Machine>> {
        let lookup_id = id.as_str().to_owned();
        self.run_in_snapshot(move |connection| {
            let row = machines::table
                .filter(machines::id.eq(&lookup_id))
                .select(MachineRow::as_select())
                .first::<MachineRow>(connection)
                .optional()?;
            let Some(machine_row) = row else {
                return Ok(None);
            };
            let changes = status_changes::table
                .filter(status_changes::machine_id.eq(&lookup_id))
                .order((status_changes::start_time.asc(), status_changes::id.asc()))
                .select(StatusChangeRow::as_select())
                .load::<StatusChangeRow>(connection)?;
            row_to_machine(machine_row, changes).map(Some)
        })
        .await
    }

    async fn delete(&self, id: &MachineId) -> MachineRepositoryResult<bool> {
        let delete_id = id.as_str().to_owned();
        self.run_in_transaction(move |connection| {
            // Status changes go with the machine through ON DELETE CASCADE.
            let deleted = diesel::delete(machines::table.filter(machines::id.eq(&delete_id)))
                .execute(connection)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn store_all(&self, new_machines: &[Machine]) -> MachineRepositoryResult<()> {
        let batch = new_machines.to_vec();
        self.run_in_transaction(move |connection| insert_machines(connection, &batch))
            .await
    }

    async fn reconcile(&self, reconciler: FleetReconciler) -> MachineRepositoryResult<Vec<Machine>> {
        self.run_in_transaction(move |connection| {
            // Blocks other writers until commit, so the fleet read below
            // stays current and concurrent refreshes run one after another.
            diesel::sql_query("LOCK TABLE machines IN SHARE ROW EXCLUSIVE MODE")
                .execute(connection)?;
            let rows = machines::table
                .select(MachineRow::as_select())
                .order(machines::id.asc())
                .load::<MachineRow>(connection)?;
            let fleet = load_fleet(connection, rows)?;

            let FleetChanges { appended, created } =
                reconciler(fleet).map_err(MachineRepositoryError::Rejected)?;
            append_status_changes(connection, &appended)?;
            insert_machines(connection, &created)?;

            let refreshed = machines::table
                .select(MachineRow::as_select())
                .order(machines::id.asc())
                .load::<MachineRow>(connection)?;
            load_fleet(connection, refreshed)
        })
        .await
    }
}

/// Loads the histories of `rows` and assembles machines in row order.
fn load_fleet(
    connection: &mut PgConnection,
    rows: Vec<MachineRow>,
) -> MachineRepositoryResult<Vec<Machine>> {
    let change_rows = status_changes::table
        .order((
            status_changes::machine_id.asc(),
            status_changes::start_time.asc(),
            status_changes::id.asc(),
        ))
        .select(StatusChangeRow::as_select())
        .load::<StatusChangeRow>(connection)?;

    let mut histories: HashMap<String, Vec<StatusChangeRow>> = HashMap::new();
    for change in change_rows {
        histories
            .entry(change.machine_id.clone())
            .or_default()
            .push(change);
    }

    rows.into_iter()
        .map(|row| {
            let changes = histories.remove(&row.id).unwrap_or_default();
            row_to_machine(row, changes)
        })
        .collect()
}

fn insert_machines(
    connection: &mut PgConnection,
    new_machines: &[Machine],
) -> MachineRepositoryResult<()> {
    if new_machines.is_empty() {
        return Ok(());
    }

    let ids: Vec<&str> = new_machines.iter().map(|m| m.id().as_str()).collect();
    // Names the first colliding id. Rows that race in between this check and
    // the insert are caught by the primary key below.
    let taken = machines::table
        .filter(machines::id.eq_any(ids))
        .select(machines::id)
        .order(machines::id.asc())
        .first::<String>(connection)
        .optional()?;
    if let Some(existing) = taken {
        let existing_id =
            MachineId::new(existing).map_err(MachineRepositoryError::invalid_persisted_data)?;
        return Err(MachineRepositoryError::DuplicateMachine(existing_id));
    }

    let machine_rows: Vec<NewMachineRow> = new_machines.iter().map(to_new_machine_row).collect();
    for chunk in machine_rows.chunks(INSERT_CHUNK_ROWS) {
        diesel::insert_into(machines::table)
            .values(chunk)
            .execute(connection)
            .map_err(|err| duplicate_or_persistence(err, chunk))?;
    }

    // History rows are inserted in ascending order so the serial id keeps
    // insertion order for equal start times.
    let change_rows: Vec<NewStatusChangeRow> = new_machines
        .iter()
        .flat_map(|machine| {
            machine
                .history()
                .iter()
                .map(|change| to_new_status_change_row(machine.id(), change))
        })
        .collect();
    for chunk in change_rows.chunks(INSERT_CHUNK_ROWS) {
        diesel::insert_into(status_changes::table)
            .values(chunk)
            .execute(connection)?;
    }
    Ok(())
}

/// Maps a primary-key violation on the machines insert to
/// [`MachineRepositoryError::DuplicateMachine`].
fn duplicate_or_persistence(err: DieselError, chunk: &[NewMachineRow]) -> MachineRepositoryError {
    let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info) = err else {
        return MachineRepositoryError::persistence(err);
    };
    let collided = info
        .details()
        .and_then(|details| chunk.iter().find(|row| details.contains(&format!("({})", row.id))))
        .or_else(|| chunk.first())
        .and_then(|row| MachineId::new(row.id.clone()).ok());
    match collided {
        Some(id) => MachineRepositoryError::DuplicateMachine(id),
        None => MachineRepositoryError::persistence(err),
    }
}

fn append_status_changes(
    connection: &mut PgConnection,
    appended: &[AppendedStatusChange],
) -> MachineRepositoryResult<()> {
    for entry in appended {
        let target = machines::table.filter(machines::id.eq(entry.machine_id.as_str()));
        let updated = diesel::update(target)
            .set(machines::current_status.eq(entry.current_status.as_str()))
            .execute(connection)?;
        if updated == 0 {
            return Err(MachineRepositoryError::NotFound(entry.machine_id.clone()));
        }

        diesel::insert_into(status_changes::table)
            .values(&to_new_status_change_row(&entry.machine_id, &entry.change))
            .execute(connection)?;
    }
    Ok(())
}

fn to_new_machine_row(machine: &Machine) -> NewMachineRow {
    NewMachineRow {
        id: machine.id().as_str().to_owned(),
        current_status: machine.current_status().as_str().to_owned(),
    }
}

fn to_new_status_change_row(machine_id: &MachineId, change: &StatusChange) -> NewStatusChangeRow {
    NewStatusChangeRow {
        machine_id: machine_id.as_str().to_owned(),
        status: change.status().as_str().to_owned(),
        start_time: change.start_time(),
    }
}

fn row_to_machine(
    row: MachineRow,
    change_rows: Vec<StatusChangeRow>,
) -> MachineRepositoryResult<Machine> {
    let MachineRow { id, current_status } = row;

    let parsed_id = MachineId::new(id).map_err(MachineRepositoryError::invalid_persisted_data)?;
    let parsed_status = MachineStatus::try_from(current_status.as_str())
        .map_err(MachineRepositoryError::invalid_persisted_data)?;
    let history = change_rows
        .into_iter()
        .map(|change| {
            MachineStatus::try_from(change.status.as_str())
                .map(|status| StatusChange::new(status, change.start_time))
                .map_err(MachineRepositoryError::invalid_persisted_data)
        })
        .collect::<MachineRepositoryResult<Vec<_>>>()?;

    let data = PersistedMachineData {
        id: parsed_id,
        current_status: parsed_status,
        history,
    };
    Machine::from_persisted(data).map_err(MachineRepositoryError::invalid_persisted_data)
}
