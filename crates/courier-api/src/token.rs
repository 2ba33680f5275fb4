use anyhow::Context;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use courier_types::api::Claims;

use crate::error::AuthError;

pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 300;

/// Issues and checks HS256 bearer tokens. Built once at startup from the
/// configured secret and shared through the application state.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64) -> anyhow::Result<String> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.ttl)
            .context("token expiry out of range")?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp() as usize,
            exp: expires.timestamp() as usize,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Returns the subject user id of a valid, unexpired token.
    pub fn verify(&self, token: &str) -> Result<i64, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            debug!("token rejected: {}", e);
            AuthError::InvalidToken
        })?;

        data.claims.sub.parse::<i64>().map_err(|_| {
            debug!("token subject {:?} is not an integer id", data.claims.sub);
            AuthError::InvalidToken
        })
    }

    /// True only for a valid token whose subject is exactly `actor_id`.
    pub fn authorize_actor_matches(&self, token: &str, actor_id: i64) -> bool {
        self.verify(token).is_ok_and(|subject| subject == actor_id)
    }
}
