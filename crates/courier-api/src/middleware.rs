use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use tracing::debug;

use crate::auth::AppState;
use crate::error::{ApiError, AuthError};

/// Raw bearer token of an authenticated request. Handlers pass it to
/// [`TokenIssuer::authorize_actor_matches`](crate::token::TokenIssuer::authorize_actor_matches)
/// to bind the token to the party the request acts for.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Extract and validate the JWT from the Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    auth: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(bearer) = auth.map_err(|_| AuthError::MissingToken)?;

    let user_id = state.tokens.verify(bearer.token())?;
    debug!(user_id, "bearer token accepted");

    req.extensions_mut()
        .insert(BearerToken(bearer.token().to_string()));
    Ok(next.run(req).await)
}
