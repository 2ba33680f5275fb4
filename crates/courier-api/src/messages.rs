use axum::{
    Extension, Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use tracing::debug;

use courier_types::api::{
    GetMessagesQuery, GetMessagesResponse, SendMessageRequest, SendMessageResponse,
};

use crate::auth::AppState;
use crate::error::{ApiError, AuthError};
use crate::middleware::BearerToken;
use crate::run_blocking;
use crate::validation::{validate_get_messages, validate_send_message};

/// The token subject must be the sender.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let Json(req) = body?;
    let msg = validate_send_message(&req)?;

    if !state.tokens.authorize_actor_matches(&token.0, msg.sender) {
        return Err(AuthError::ActorMismatch.into());
    }

    let db = state.clone();
    let (id, timestamp) = run_blocking(move || {
        Ok(db.db.send_message(msg.sender, msg.recipient, &msg.detail)?)
    })
    .await?;

    Ok(Json(SendMessageResponse { id, timestamp }))
}

/// The token subject must be the recipient whose inbox is read.
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(token): Extension<BearerToken>,
    query: Result<Query<GetMessagesQuery>, QueryRejection>,
) -> Result<Json<GetMessagesResponse>, ApiError> {
    let Query(query) = query?;
    let page = validate_get_messages(&query)?;

    if !state.tokens.authorize_actor_matches(&token.0, page.recipient) {
        return Err(AuthError::ActorMismatch.into());
    }

    let db = state.clone();
    let messages = run_blocking(move || {
        Ok(db.db.get_messages(page.recipient, page.start, page.limit)?)
    })
    .await?;

    debug!(
        recipient = page.recipient,
        start = page.start,
        returned = messages.len(),
        "inbox page served"
    );
    Ok(Json(GetMessagesResponse { messages }))
}
