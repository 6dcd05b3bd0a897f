//! Serves the machine status API.
//!
//! Usage:
//!
//! ```text
//! machine_status_server [--database-url <url>] [--bind <addr>] [--pool-size <n>] [--in-memory]
//! ```
//!
//! The database URL may also come from `DATABASE_URL` or
//! `SQLALCHEMY_DATABASE_URL`. The machine tables are created on startup when
//! missing.

use std::sync::Arc;

use clap::Parser;
use machine_status::{
    config::{ServerConfig, StorageConfig},
    http::router,
    machine::{
        adapters::{
            memory::InMemoryMachineRepository,
            postgres::{PostgresMachineRepository, build_pool},
        },
        services::MachineFleetService,
    },
    telemetry::init_tracing,
};
use mockable::DefaultClock;
use tracing::{error, info, warn};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = ServerConfig::parse();
    init_tracing();

    let storage = config.storage().inspect_err(|err| {
        error!(error = %err, "configuration error");
    })?;

    let app = match storage {
        StorageConfig::InMemory => {
            warn!("running with in-memory storage; machines are lost on exit");
            let repository = Arc::new(InMemoryMachineRepository::new());
            router(Arc::new(MachineFleetService::new(
                repository,
                Arc::new(DefaultClock),
            )))
        }
        StorageConfig::Postgres { url, pool_size } => {
            info!(pool_size, "connecting to database");
            let pool = tokio::task::spawn_blocking(move || build_pool(&url, pool_size)).await??;
            let repository = PostgresMachineRepository::new(pool);
            repository.ensure_schema().await?;
            info!("database schema ready");
            router(Arc::new(MachineFleetService::new(
                Arc::new(repository),
                Arc::new(DefaultClock),
            )))
        }
    };

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    info!(addr = %listener.local_addr()?, "machine status API listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

/// Waits for Ctrl+C.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received shutdown signal"),
        Err(err) => {
            error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
