/// Failures surfaced by the credential and message stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Username taken")]
    AlreadyExists,
    #[error("User does not exist")]
    NotFound,
    #[error("Sender or recipient does not exist")]
    UnknownUser,
    #[error("Message type not supported: {0}")]
    UnsupportedType(String),
    #[error("corrupt message {msg_id}: {reason}")]
    Corrupt { msg_id: i64, reason: String },
    #[error("database lock poisoned")]
    LockPoisoned,
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl StoreError {
    /// Extended SQLite result code when this is a constraint violation.
    pub(crate) fn constraint_code(err: &rusqlite::Error) -> Option<i32> {
        match err {
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Some(e.extended_code)
            }
            _ => None,
        }
    }
}
