//! Machine status: a small backend tracking machine status histories.
//!
//! Machines carry an ordered history of status changes whose latest entry
//! determines the current status. The crate generates random demo histories,
//! refreshes a stored fleet atomically and serves it over an HTTP JSON API.
//!
//! # Architecture
//!
//! The machine context follows hexagonal architecture principles:
//!
//! - **Domain**: status vocabulary, machine aggregate and history generator
//! - **Ports**: the repository trait the services depend on
//! - **Adapters**: in-memory and `PostgreSQL` repositories
//! - **Services**: fleet reads, deletes, generation and refresh
//!
//! # Modules
//!
//! - [`machine`]: machine status domain and its storage
//! - [`http`]: axum router exposing the fleet service
//! - [`config`]: command-line and environment configuration
//! - [`telemetry`]: tracing subscriber setup

pub mod config;
pub mod http;
pub mod machine;
pub mod telemetry;
