//! `PostgreSQL` adapters for machine status persistence.

mod models;
mod repository;
mod schema;

pub use repository::{
    CREATE_SCHEMA_SQL, MachinePgPool, PostgresMachineRepository, build_pool,
};
