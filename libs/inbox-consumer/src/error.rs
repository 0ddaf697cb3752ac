//! Error types for the inbox consumer library

use thiserror::Error;

pub type InboxResult<T> = Result<T, InboxError>;

#[derive(Error, Debug)]
pub enum InboxError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid event ID: {0}")]
    InvalidEventId(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl InboxError {
    /// PostgreSQL unique-violation code — only possible here if two
    /// concurrent consumers race on the same event id, since `claim_event`
    /// already uses `ON CONFLICT DO NOTHING` to make that race a no-op rather
    /// than an error.
    pub fn is_duplicate_key(&self) -> bool {
        match self {
            InboxError::Database(sqlx_err) => sqlx_err
                .as_database_error()
                .and_then(|e| e.code())
                .as_deref()
                == Some("23505"),
            _ => false,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            InboxError::Database(sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed)
        )
    }
}
