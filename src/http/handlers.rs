//! Route handlers for the machine API.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use mockable::Clock;

use super::error::ApiError;
use super::views::{GenerateMachinesRequest, MachineView};
use crate::machine::{
    domain::Machine,
    ports::MachineRepository,
    services::{DEFAULT_FLEET_SIZE, MachineFleetService},
};

type FleetState<R, C> = State<Arc<MachineFleetService<R, C>>>;

fn views(machines: &[Machine]) -> Vec<MachineView> {
    machines.iter().map(MachineView::from).collect()
}

/// GET /health
pub(super) async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// Fallback for unmatched routes.
pub(super) async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "not found" })),
    )
}

/// GET /api/machines
pub(super) async fn list_machines<R, C>(
    State(service): FleetState<R, C>,
) -> Result<Json<Vec<MachineView>>, ApiError>
where
    R: MachineRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let machines = service.list_machines().await?;
    Ok(Json(views(&machines)))
}

/// GET /api/machines/{id}
pub(super) async fn get_machine<R, C>(
    State(service): FleetState<R, C>,
    Path(id): Path<String>,
) -> Result<Json<MachineView>, ApiError>
where
    R: MachineRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    service
        .get_machine(&id)
        .await?
        .map(|machine| Json(MachineView::from(&machine)))
        .ok_or(ApiError::MachineNotFound)
}

/// DELETE /api/machines/{id}
pub(super) async fn delete_machine<R, C>(
    State(service): FleetState<R, C>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
    R: MachineRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    if service.delete_machine(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::MachineNotFound)
    }
}

/// POST /api/generate_machines
///
/// An empty body refreshes towards the default fleet size.
pub(super) async fn generate_machines<R, C>(
    State(service): FleetState<R, C>,
    body: Bytes,
) -> Result<Json<Vec<MachineView>>, ApiError>
where
    R: MachineRepository + 'static,
    C: Clock + Send + Sync + 'static,
{
    let request = parse_generate_request(&body)?;
    let target = request.count.unwrap_or(DEFAULT_FLEET_SIZE);
    let machines = service.refresh(target).await?;
    Ok(Json(views(&machines)))
}

fn parse_generate_request(body: &[u8]) -> Result<GenerateMachinesRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateMachinesRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|err| ApiError::InvalidRequest(format!("invalid request body: {err}")))
}
