//! Shared test helpers for `PostgreSQL` integration tests.

pub use super::cluster::{PostgresCluster, postgres_cluster, test_runtime};
use machine_status::machine::{
    adapters::postgres::{PostgresMachineRepository, build_pool},
    domain::{Machine, MachineId, MachineStatus, StatusChange},
};
use crate::test_helpers::at;
use diesel::prelude::*;
use rstest::fixture;
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Drops the temporary database when the test finishes.
pub struct CleanupGuard {
    cluster: PostgresCluster,
    db_name: String,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        drop(self.cluster.drop_database(&self.db_name));
    }
}

/// Repository bound to a fresh database with the schema applied.
pub struct PgContext {
    pub repo: PostgresMachineRepository,
    pub rt: Runtime,
    pub cluster: PostgresCluster,
    pub db_name: String,
    _guard: CleanupGuard,
}

/// Creates a fresh database and repository with the schema applied.
#[fixture]
pub fn pg_context() -> PgContext {
    let cluster = postgres_cluster();
    let db_name = format!("machines_{}", Uuid::new_v4().simple());
    cluster
        .create_database(&db_name)
        .expect("test database creation");
    let guard = CleanupGuard {
        cluster,
        db_name: db_name.clone(),
    };
    let pool = build_pool(&cluster.database_url(&db_name), 2).expect("connection pool");
    let repo = PostgresMachineRepository::new(pool);
    let rt = test_runtime().expect("tokio runtime");
    rt.block_on(repo.ensure_schema()).expect("schema setup");
    PgContext {
        repo,
        rt,
        cluster,
        db_name,
        _guard: guard,
    }
}

/// Builds a machine whose history is given as `(status, hour, minute)`.
pub fn machine(sequence: u32, changes: &[(MachineStatus, u32, u32)]) -> Machine {
    let history = changes
        .iter()
        .map(|&(status, hour, minute)| StatusChange::new(status, at(hour, minute, 0)))
        .collect();
    Machine::new(
        MachineId::from_sequence(sequence).expect("valid sequence"),
        history,
    )
    .expect("valid machine")
}

#[derive(diesel::QueryableByName)]
struct CountRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    count: i64,
}

/// Counts status change rows stored for `machine_id`, bypassing the
/// repository.
pub fn count_status_change_rows(context: &PgContext, machine_id: &str) -> i64 {
    let mut conn = PgConnection::establish(&context.cluster.database_url(&context.db_name))
        .expect("direct connection");
    diesel::sql_query("SELECT COUNT(*) AS count FROM status_changes WHERE machine_id = $1")
        .bind::<diesel::sql_types::Text, _>(machine_id)
        .get_result::<CountRow>(&mut conn)
        .expect("count query")
        .count
}

/// Overwrites the cached current status of `machine_id`, bypassing the
/// repository.
pub fn corrupt_current_status(context: &PgContext, machine_id: &str, status: &str) {
    let mut conn = PgConnection::establish(&context.cluster.database_url(&context.db_name))
        .expect("direct connection");
    diesel::sql_query("UPDATE machines SET current_status = $1 WHERE id = $2")
        .bind::<diesel::sql_types::Text, _>(status)
        .bind::<diesel::sql_types::Text, _>(machine_id)
        .execute(&mut conn)
        .expect("update query");
}
