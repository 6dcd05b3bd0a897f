//! Server configuration from command-line flags and environment variables.

use std::net::SocketAddr;

use clap::Parser;
use thiserror::Error;

/// Environment variable consulted when `DATABASE_URL` is unset, kept for
/// deployments configured for the previous server.
pub const LEGACY_DATABASE_URL_ENV: &str = "SQLALCHEMY_DATABASE_URL";

/// Machine status API server.
#[derive(Debug, Clone, Parser)]
#[command(name = "machine_status_server", version, about = "Machine status API server")]
pub struct ServerConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Socket address to listen on
    #[arg(long, env = "MACHINE_STATUS_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Maximum pooled database connections
    #[arg(
        long,
        env = "MACHINE_STATUS_POOL_SIZE",
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub pool_size: u32,

    /// Keep machines in process memory instead of a database
    #[arg(long)]
    pub in_memory: bool,
}

/// Where machine records are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// Process-local storage, lost on exit.
    InMemory,
    /// `PostgreSQL` storage.
    Postgres {
        /// Normalised connection string.
        url: String,
        /// Maximum pooled connections.
        pool_size: u32,
    },
}

/// Configuration errors detected at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither a database URL nor `--in-memory` was given.
    #[error("no database configured: set DATABASE_URL or pass --in-memory")]
    MissingDatabaseUrl,
}

impl ServerConfig {
    /// Resolves the storage backend, falling back to
    /// [`LEGACY_DATABASE_URL_ENV`] when no URL was supplied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabaseUrl`] when no URL is available
    /// and `--in-memory` is not set.
    pub fn storage(&self) -> Result<StorageConfig, ConfigError> {
        self.storage_with_fallback(std::env::var(LEGACY_DATABASE_URL_ENV).ok())
    }

    /// Resolves the storage backend with an explicit fallback URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingDatabaseUrl`] when neither URL is
    /// present and `--in-memory` is not set.
    pub fn storage_with_fallback(
        &self,
        fallback_url: Option<String>,
    ) -> Result<StorageConfig, ConfigError> {
        if self.in_memory {
            return Ok(StorageConfig::InMemory);
        }
        let url = self
            .database_url
            .clone()
            .or(fallback_url)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;
        Ok(StorageConfig::Postgres {
            url: normalize_database_url(url.trim()),
            pool_size: self.pool_size,
        })
    }
}

/// Strips a driver suffix such as `+psycopg2` from the URL scheme.
///
/// ```
/// use machine_status::config::normalize_database_url;
///
/// assert_eq!(
///     normalize_database_url("postgresql+psycopg2://u:p@db/machines"),
///     "postgresql://u:p@db/machines"
/// );
/// ```
#[must_use]
pub fn normalize_database_url(url: &str) -> String {
    if let Some((scheme, rest)) = url.split_once("://")
        && let Some((base, _driver)) = scheme.split_once('+')
    {
        return format!("{base}://{rest}");
    }
    url.to_owned()
}
