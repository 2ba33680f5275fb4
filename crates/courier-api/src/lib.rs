pub mod auth;
pub mod credentials;
pub mod error;
pub mod health;
pub mod messages;
pub mod middleware;
pub mod token;
pub mod validation;

use axum::{Router, routing::post};
use tracing::error;

use crate::auth::AppState;
use crate::error::ApiError;

/// All routes. `/messages` sits behind bearer-token auth; the rest are public.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/check", post(health::check))
        .route("/users", post(auth::register))
        .route("/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route(
            "/messages",
            post(messages::send_message).get(messages::get_messages),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}

/// Run blocking DB or hashing work off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.to_string())
    })?
}
