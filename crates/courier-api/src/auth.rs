use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::info;

use courier_db::Database;
use courier_types::api::{CreateUserResponse, LoginResponse, UserRequest};

use crate::credentials;
use crate::error::ApiError;
use crate::run_blocking;
use crate::token::TokenIssuer;
use crate::validation::validate_user;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenIssuer,
}

pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<CreateUserResponse>, ApiError> {
    let Json(req) = body?;
    validate_user(&req)?;

    // Argon2 and SQLite both block; keep them off the async runtime
    let db = state.clone();
    let username = req.username.clone();
    let id = run_blocking(move || credentials::create_user(&db.db, &req.username, &req.password))
        .await?;

    info!(user_id = id, "registered user {}", username);
    Ok(Json(CreateUserResponse { id }))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = body?;
    validate_user(&req)?;

    let db = state.clone();
    let id = run_blocking(move || credentials::verify_login(&db.db, &req.username, &req.password))
        .await?;

    let token = state
        .tokens
        .issue(id)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))?;

    Ok(Json(LoginResponse { id, token }))
}
