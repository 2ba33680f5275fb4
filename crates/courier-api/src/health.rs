use axum::{Json, extract::State};
use tracing::error;

use courier_types::api::HealthResponse;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::run_blocking;

/// Liveness probe: answers only when the database does.
pub async fn check(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let db = state.clone();
    let alive = run_blocking(move || {
        db.db.ping().map_err(|e| {
            error!("health probe failed: {}", e);
            ApiError::Unavailable("DB connection error")
        })
    })
    .await?;

    if !alive {
        return Err(ApiError::Unavailable("Unexpected query result"));
    }

    Ok(Json(HealthResponse {
        health: "ok".to_string(),
    }))
}
