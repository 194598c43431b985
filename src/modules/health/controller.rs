use axum::{Json, extract::State, http::StatusCode};
use mashar_models::HealthResponse;
use tracing::instrument;

use crate::state::AppState;

/// Pings the database so a recovered connection is picked up, then reports it.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "API and database are up", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "Health"
)]
#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let connected = mashar_db::check_connection(state.raw_pool(), &state.connection).await;
    let (status, database) = if connected {
        (StatusCode::OK, "connected")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "disconnected")
    };

    (
        status,
        Json(HealthResponse {
            status: "ok".to_string(),
            database: database.to_string(),
        }),
    )
}
