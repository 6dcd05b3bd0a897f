//! HTTP JSON API over the machine fleet service.
//!
//! Endpoints:
//! - GET    /health                 - Liveness probe
//! - GET    /api/machines           - Every machine with its history
//! - GET    /api/machines/{id}      - One machine, 404 when unknown
//! - DELETE /api/machines/{id}      - 204 on delete, 404 when unknown
//! - POST   /api/generate_machines  - Refresh the fleet, topping it up to
//!   the requested count (default 100)
//!
//! All bodies are JSON. Errors use the shape `{"error": "..."}`.

mod error;
mod handlers;
mod views;

use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use axum::routing::{get, post};
use mockable::Clock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::machine::{ports::MachineRepository, services::MachineFleetService};

pub use error::ApiError;
pub use views::{GenerateMachinesRequest, MachineView, StatusChangeView};

/// Builds the API router around a shared fleet service.
///
/// CORS is permissive so browser dashboards on other origins can poll the
/// API.
pub fn router<R, C>(service: Arc<MachineFleetService<R, C>>) -> Router
where
    R: MachineRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/machines", get(handlers::list_machines::<R, C>))
        .route(
            "/api/machines/{id}",
            get(handlers::get_machine::<R, C>).delete(handlers::delete_machine::<R, C>),
        )
        .route(
            "/api/generate_machines",
            post(handlers::generate_machines::<R, C>),
        )
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(service)
}
