use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use courier_db::Database;

use crate::error::{ApiError, AuthError};

/// Hashes with Argon2id and a fresh random salt. The PHC string embeds the
/// salt and parameters, so it is all `verify_login` needs.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Registers a user. Fails with `Conflict` when the username is taken.
pub fn create_user(db: &Database, username: &str, password: &str) -> Result<i64, ApiError> {
    let password_hash = hash_password(password)?;
    Ok(db.create_user(username, &password_hash)?)
}

/// Checks a username/password pair and returns the user's id.
pub fn verify_login(db: &Database, username: &str, password: &str) -> Result<i64, ApiError> {
    let user = db.get_user_by_username(username)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(format!("stored hash for {username} unreadable: {e}")))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)?;

    Ok(user.id)
}
