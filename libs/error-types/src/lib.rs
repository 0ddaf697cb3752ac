//! Unified error taxonomy for the payment pipeline services.
//!
//! One enum, `PipelineError`, is shared by all three binaries. It implements
//! `actix_web::ResponseError` for the HTTP boundary and exposes a
//! `pipeline_action()` classifier so broker-facing code (Outbox Dispatcher,
//! Inbox Consumer) can decide ack/nack/terminal-result without duplicating
//! the error taxonomy.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// The error kinds recognised by the payment pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("illegal transition: {0}")]
    IllegalTransition(String),

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("concurrency conflict")]
    ConcurrencyConflict,

    #[error("broker unavailable: {0}")]
    TransientBroker(String),

    #[error("database unavailable: {0}")]
    TransientDatabase(String),

    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("fatal error: {0}")]
    Fatal(String),
}

/// Minimal HTTP error envelope. Intentionally just `{"error": "<message>"}` —
/// no error_type/code/timestamp enrichment, unlike the richer internal
/// classification this type carries for logging and metrics.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ResponseError for PipelineError {
    fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::InvalidInput(_)
            | PipelineError::AlreadyExists(_)
            | PipelineError::IllegalTransition(_) => StatusCode::BAD_REQUEST,
            PipelineError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

/// What the pipeline should do with a broker message that failed while being
/// processed. Keeps the ack/nack decision in one place instead of scattering
/// `match`es over `PipelineError` across the Outbox Dispatcher and Inbox
/// Consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineAction {
    /// Roll back the transaction, leave the broker message unacknowledged
    /// so it is redelivered.
    Nack,
    /// Acknowledge the broker message and discard it; the failure is logged
    /// but not retried.
    AckDiscard,
    /// Terminal for this payment: commit a `PaymentResult{success:false}`
    /// and acknowledge the broker message. Not a redelivery candidate.
    Terminal,
}

impl PipelineError {
    pub fn pipeline_action(&self) -> PipelineAction {
        match self {
            PipelineError::TransientBroker(_) | PipelineError::TransientDatabase(_) => {
                PipelineAction::Nack
            }
            PipelineError::Malformed(_) => PipelineAction::AckDiscard,
            PipelineError::InsufficientFunds | PipelineError::ConcurrencyConflict => {
                PipelineAction::Terminal
            }
            _ => PipelineAction::AckDiscard,
        }
    }
}

impl From<sqlx::Error> for PipelineError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => PipelineError::NotFound("resource not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                PipelineError::TransientDatabase(err.to_string())
            }
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref() == Some("23505") {
                    PipelineError::AlreadyExists(db_err.message().to_string())
                } else {
                    PipelineError::TransientDatabase(err.to_string())
                }
            }
            _ => PipelineError::TransientDatabase(err.to_string()),
        }
    }
}

impl From<lapin::Error> for PipelineError {
    fn from(err: lapin::Error) -> Self {
        PipelineError::TransientBroker(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Malformed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PipelineError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PipelineError::AlreadyExists("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PipelineError::IllegalTransition("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            PipelineError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PipelineError::InsufficientFunds.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            PipelineError::Fatal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_pipeline_action_classification() {
        assert_eq!(
            PipelineError::TransientBroker("x".into()).pipeline_action(),
            PipelineAction::Nack
        );
        assert_eq!(
            PipelineError::TransientDatabase("x".into()).pipeline_action(),
            PipelineAction::Nack
        );
        assert_eq!(
            PipelineError::Malformed("x".into()).pipeline_action(),
            PipelineAction::AckDiscard
        );
        assert_eq!(
            PipelineError::InsufficientFunds.pipeline_action(),
            PipelineAction::Terminal
        );
        assert_eq!(
            PipelineError::ConcurrencyConflict.pipeline_action(),
            PipelineAction::Terminal
        );
    }

    #[test]
    fn test_error_body_is_minimal() {
        let err = PipelineError::NotFound("order 123".to_string());
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
