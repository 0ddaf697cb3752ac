//! # Transactional Inbox
//!
//! Provides exactly-once semantics for broker-delivered events by recording
//! each event's natural dedup key in a `inbox_events` table inside the same
//! database transaction as the business mutation it triggers and the
//! resulting outbox insert.
//!
//! ## Why transaction-scoped
//!
//! A pool-owning guard (check → run business logic → mark processed) cannot
//! make the inbox row, the ledger debit, and the result-outbox row atomic:
//! a crash between "mark processed" and "commit the debit" either loses the
//! debit or double-processes the event on redelivery. Every operation here
//! instead takes the caller's already-open `sqlx::Transaction`, so a single
//! `tx.commit()` covers all three writes (Invariant: inbox insert + ledger
//! mutation + outbox insert commit together or not at all).
//!
//! ## Usage
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//!
//! match claim_event(&mut tx, &order_id, "PAYMENT_REQUEST", &payload).await? {
//!     ClaimOutcome::AlreadyClaimed => {
//!         tx.commit().await?; // nothing else to do, this is a redelivery
//!         return Ok(());
//!     }
//!     ClaimOutcome::Claimed => {}
//! }
//!
//! let success = ledger.debit_in_tx(&mut tx, &user_id, amount).await.is_ok();
//! finalize_event(&mut tx, &order_id, if success { EventStatus::Processed } else { EventStatus::Failed }).await?;
//! // ... insert the PAYMENT_RESULT outbox row in the same tx ...
//! tx.commit().await?;
//! ```

mod error;

pub use error::{InboxError, InboxResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Transaction};

/// Lifecycle of a claimed inbox row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    Pending,
    Processed,
    Failed,
}

impl EventStatus {
    fn as_db_str(&self) -> &'static str {
        match self {
            EventStatus::Pending => "PENDING",
            EventStatus::Processed => "PROCESSED",
            EventStatus::Failed => "FAILED",
        }
    }
}

/// The result of attempting to claim an event id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// First time this event id has been seen; caller should run its
    /// business logic and finalize the row.
    Claimed,
    /// An inbox row already exists for this event id — a redelivery.
    /// Callers must not re-run business logic or re-emit a result.
    AlreadyClaimed,
}

#[derive(Debug, sqlx::FromRow)]
pub struct InboxEvent {
    pub id: String,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub status: String,
    pub processed_at: DateTime<Utc>,
    pub retry_count: i32,
}

fn validate_event_id(event_id: &str) -> InboxResult<()> {
    if event_id.is_empty() {
        return Err(InboxError::InvalidEventId("event id is empty".to_string()));
    }
    if event_id.len() > 255 {
        return Err(InboxError::InvalidEventId(format!(
            "event id exceeds 255 characters: {} chars",
            event_id.len()
        )));
    }
    Ok(())
}

/// Insert the inbox row for `event_id` if one doesn't already exist, as part
/// of `tx`. Returns [`ClaimOutcome::AlreadyClaimed`] without raising an error
/// when the row already exists — that's the expected shape of a redelivery,
/// not a failure.
pub async fn claim_event(
    tx: &mut Transaction<'_, Postgres>,
    event_id: &str,
    event_type: &str,
    payload: &serde_json::Value,
) -> InboxResult<ClaimOutcome> {
    validate_event_id(event_id)?;

    let inserted = sqlx::query(
        "INSERT INTO inbox_events (id, type, payload, status, processed_at, retry_count) \
         VALUES ($1, $2, $3, 'PENDING', now(), 0) \
         ON CONFLICT (id) DO NOTHING \
         RETURNING id",
    )
    .bind(event_id)
    .bind(event_type)
    .bind(payload)
    .fetch_optional(&mut **tx)
    .await?;

    if inserted.is_some() {
        return Ok(ClaimOutcome::Claimed);
    }

    // A row already exists: this delivery is a redelivery of an event this
    // inbox already handled (or is mid-handling). Bump retry_count purely
    // for observability — the dedup key (not this counter) is what bounds
    // work to one real execution (§4.3 step 3a).
    sqlx::query("UPDATE inbox_events SET retry_count = retry_count + 1 WHERE id = $1")
        .bind(event_id)
        .execute(&mut **tx)
        .await?;

    Ok(ClaimOutcome::AlreadyClaimed)
}

/// Move a claimed row to its terminal status, as part of `tx`.
pub async fn finalize_event(
    tx: &mut Transaction<'_, Postgres>,
    event_id: &str,
    status: EventStatus,
) -> InboxResult<()> {
    sqlx::query("UPDATE inbox_events SET status = $1 WHERE id = $2")
        .bind(status.as_db_str())
        .bind(event_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Pool-level read, for admin/diagnostic use outside of the processing
/// transaction (e.g. an HTTP status endpoint).
pub async fn is_processed(pool: &PgPool, event_id: &str) -> InboxResult<bool> {
    let row: Option<(String,)> = sqlx::query_as("SELECT status FROM inbox_events WHERE id = $1")
        .bind(event_id)
        .fetch_optional(pool)
        .await?;
    Ok(matches!(row, Some((status,)) if status == "PROCESSED"))
}

/// Delete rows that reached a terminal status more than `retention` ago.
/// Never deletes `PENDING` rows, even if stale — a stuck `PENDING` row means
/// a crash mid-processing and is an operational signal, not cleanup debris.
pub async fn cleanup_old_events(
    pool: &PgPool,
    retention: chrono::Duration,
) -> InboxResult<u64> {
    let cutoff = Utc::now() - retention;
    let result = sqlx::query(
        "DELETE FROM inbox_events WHERE status != 'PENDING' AND processed_at < $1",
    )
    .bind(cutoff)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_event_id() {
        assert!(validate_event_id("order-123").is_ok());
        assert!(validate_event_id("").is_err());
        assert!(validate_event_id(&"x".repeat(256)).is_err());
        assert!(validate_event_id(&"x".repeat(255)).is_ok());
    }

    #[test]
    fn test_status_db_strings() {
        assert_eq!(EventStatus::Pending.as_db_str(), "PENDING");
        assert_eq!(EventStatus::Processed.as_db_str(), "PROCESSED");
        assert_eq!(EventStatus::Failed.as_db_str(), "FAILED");
    }

    #[test]
    fn test_claim_outcome_equality() {
        assert_eq!(ClaimOutcome::Claimed, ClaimOutcome::Claimed);
        assert_ne!(ClaimOutcome::Claimed, ClaimOutcome::AlreadyClaimed);
    }
}
