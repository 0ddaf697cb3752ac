//! # Transactional Outbox Pattern Implementation
//!
//! This library implements the Transactional Outbox pattern to ensure reliable event publishing
//! in microservices architectures. It guarantees that database writes and event publishing happen
//! atomically, preventing data inconsistencies.
//!
//! ## What is the Transactional Outbox Pattern?
//!
//! The Transactional Outbox pattern ensures that:
//! 1. Business logic changes (database writes) and event creation happen in the same transaction
//! 2. Events are stored in an "outbox" table within the same database
//! 3. A background processor claims unpublished events with `FOR UPDATE SKIP LOCKED` and
//!    publishes them to the broker
//! 4. Events are marked as published only after successful broker delivery, in the same
//!    transaction that claimed them
//!
//! This guarantees **at-least-once delivery** and prevents event loss even if:
//! - The service crashes after database commit but before broker publish
//! - The broker is temporarily unavailable
//! - Multiple dispatcher instances run concurrently (`SKIP LOCKED` keeps them from
//!   double-claiming the same row)
//!
//! ## Why is it needed?
//!
//! Without this pattern, you face these problems:
//! - **Lost events**: Database commits but event publishing fails → data divergence
//! - **Duplicate events**: Publishing succeeds but database commit fails → inconsistency
//! - **Split brain**: Different services see different versions of truth
//!
//! ## Usage Example
//!
//! ### 1. Insert data and event in same transaction
//!
//! ```rust,no_run
//! use transactional_outbox::{OutboxEvent, OutboxRepository, SqlxOutboxRepository};
//! use sqlx::PgPool;
//! use uuid::Uuid;
//! use chrono::Utc;
//!
//! async fn create_order(
//!     pool: &PgPool,
//!     outbox_repo: &SqlxOutboxRepository,
//!     order_id: Uuid,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut tx = pool.begin().await?;
//!
//!     sqlx::query("INSERT INTO orders (id, status) VALUES ($1, 'PENDING')")
//!         .bind(order_id)
//!         .execute(&mut *tx)
//!         .await?;
//!
//!     let event = OutboxEvent {
//!         id: Uuid::new_v4(),
//!         aggregate_type: "order".to_string(),
//!         aggregate_id: order_id,
//!         event_type: "PAYMENT_REQUEST".to_string(),
//!         payload: serde_json::json!({ "order_id": order_id }),
//!         metadata: None,
//!         created_at: Utc::now(),
//!         published_at: None,
//!         retry_count: 0,
//!         last_error: None,
//!     };
//!
//!     outbox_repo.insert(&mut tx, &event).await?;
//!
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```
//!
//! ### 2. Start background processor
//!
//! ```rust,no_run
//! use transactional_outbox::{AmqpOutboxPublisher, OutboxProcessor, SqlxOutboxRepository};
//! use broker::{Broker, BrokerConfig, Publisher};
//! use sqlx::PgPool;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = PgPool::connect("postgresql://localhost/orders").await?;
//!
//!     let mq = Broker::connect(&BrokerConfig::from_env()).await?;
//!     let publisher = Arc::new(AmqpOutboxPublisher::new(Publisher::new(&mq).await?));
//!     let repository = Arc::new(SqlxOutboxRepository::new(pool));
//!
//!     let processor = OutboxProcessor::new(
//!         repository,
//!         publisher,
//!         100,                    // batch_size
//!         Duration::from_secs(1), // poll_interval
//!     );
//!
//!     processor.start().await?;
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

mod error;
pub mod metrics;

pub use error::{OutboxError, OutboxResult};

/// Represents an event stored in the outbox table.
///
/// Events are created within a database transaction alongside business logic changes,
/// ensuring atomicity. They are later published to the broker by the background processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    /// Unique identifier for this event
    pub id: Uuid,

    /// Type of aggregate this event relates to (e.g., "order", "payment")
    pub aggregate_type: String,

    /// ID of the entity this event relates to
    pub aggregate_id: Uuid,

    /// Fully qualified event type (e.g., "PAYMENT_REQUEST", "PAYMENT_RESULT")
    pub event_type: String,

    /// Event payload as JSON
    pub payload: serde_json::Value,

    /// Optional metadata (correlation_id, trace_id, etc.)
    pub metadata: Option<serde_json::Value>,

    /// Timestamp when event was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when event was successfully published (None = unpublished)
    pub published_at: Option<DateTime<Utc>>,

    /// Number of failed publish attempts. Kept for observability; the
    /// dispatcher's backoff is keyed on *consecutive broker failures*
    /// instead (see [`OutboxProcessor::calculate_backoff`]), since a single
    /// stuck row shouldn't be penalized more than a broker outage already is.
    pub retry_count: i32,

    /// Last error message from failed publish attempt
    pub last_error: Option<String>,
}

/// Repository trait for managing outbox events in the database.
///
/// This trait abstracts database operations to allow for testing and
/// alternative implementations.
#[async_trait]
pub trait OutboxRepository: Send + Sync {
    /// Insert a new event into the outbox within a transaction.
    ///
    /// This method MUST be called within an existing transaction to ensure
    /// atomicity with business logic changes.
    async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event: &OutboxEvent,
    ) -> OutboxResult<()>;

    /// Open a transaction and claim up to `limit` unpublished events with
    /// `FOR UPDATE SKIP LOCKED`, so that multiple dispatcher instances can
    /// run against the same table without claiming the same row twice.
    ///
    /// The caller owns the returned transaction and is responsible for
    /// calling [`OutboxRepository::mark_published`] / [`OutboxRepository::mark_failed`]
    /// against it and then committing — the claimed rows stay locked until then.
    async fn begin_claim(
        &self,
        limit: i32,
    ) -> OutboxResult<(Transaction<'static, Postgres>, Vec<OutboxEvent>)>;

    /// Mark a claimed event as successfully published, as part of `tx`.
    async fn mark_published(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event_id: Uuid,
    ) -> OutboxResult<()>;

    /// Mark a claimed event as failed with error details, as part of `tx`.
    /// Increments retry count and stores the error message for debugging.
    async fn mark_failed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event_id: Uuid,
        error: &str,
    ) -> OutboxResult<()>;

    /// Compute pending count and oldest pending age (seconds). Should return age=0 if none pending.
    async fn pending_stats(&self) -> OutboxResult<(i64, i64)>;
}

/// SQLx-based implementation of OutboxRepository using PostgreSQL.
pub struct SqlxOutboxRepository {
    pool: PgPool,
}

impl SqlxOutboxRepository {
    /// Create a new repository with the given database pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Return pending count and oldest pending age (seconds). If no pending, age = 0.
    pub async fn pending_stats(&self) -> OutboxResult<(i64, i64)> {
        let rec = sqlx::query(
            r#"
            SELECT
                COUNT(*)::BIGINT AS pending,
                EXTRACT(EPOCH FROM (NOW() - MIN(created_at)))::BIGINT AS age_seconds
            FROM outbox_events
            WHERE published_at IS NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .context("Failed to compute pending stats")?;

        let pending: i64 = rec.try_get("pending").unwrap_or(0);
        let age: i64 = rec.try_get("age_seconds").unwrap_or(0);
        Ok((pending, age))
    }

    /// Replay events created since the given timestamp by resetting published_at and retry counters.
    pub async fn replay_since(&self, ts: DateTime<Utc>) -> OutboxResult<u64> {
        let res = sqlx::query(
            r#"
            UPDATE outbox_events
            SET published_at = NULL,
                retry_count = 0,
                last_error = NULL
            WHERE created_at >= $1
            "#,
        )
        .bind(ts)
        .execute(&self.pool)
        .await
        .context("Failed to replay events since timestamp")?;

        Ok(res.rows_affected())
    }

    /// Replay events by ID range (inclusive) for operational backfill.
    pub async fn replay_range(&self, from_id: Uuid, to_id: Uuid) -> OutboxResult<u64> {
        let res = sqlx::query(
            r#"
            UPDATE outbox_events
            SET published_at = NULL,
                retry_count = 0,
                last_error = NULL
            WHERE id BETWEEN $1 AND $2
            "#,
        )
        .bind(from_id)
        .bind(to_id)
        .execute(&self.pool)
        .await
        .context("Failed to replay events by id range")?;

        Ok(res.rows_affected())
    }

    fn row_to_event(row: &sqlx::postgres::PgRow) -> Result<OutboxEvent, sqlx::Error> {
        Ok(OutboxEvent {
            id: row.try_get("id")?,
            aggregate_type: row.try_get("aggregate_type")?,
            aggregate_id: row.try_get("aggregate_id")?,
            event_type: row.try_get("event_type")?,
            payload: row.try_get("payload")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get("created_at")?,
            published_at: row.try_get("published_at")?,
            retry_count: row.try_get("retry_count")?,
            last_error: row.try_get("last_error")?,
        })
    }
}

#[async_trait]
impl OutboxRepository for SqlxOutboxRepository {
    async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event: &OutboxEvent,
    ) -> OutboxResult<()> {
        sqlx::query(
            r#"
            INSERT INTO outbox_events (
                id,
                aggregate_type,
                aggregate_id,
                event_type,
                payload,
                metadata,
                created_at,
                published_at,
                retry_count,
                last_error
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(event.id)
        .bind(&event.aggregate_type)
        .bind(event.aggregate_id)
        .bind(&event.event_type)
        .bind(&event.payload)
        .bind(&event.metadata)
        .bind(event.created_at)
        .bind(event.published_at)
        .bind(event.retry_count)
        .bind(&event.last_error)
        .execute(&mut **tx)
        .await
        .context("Failed to insert event into outbox")?;

        debug!(
            event_id = %event.id,
            event_type = %event.event_type,
            aggregate_id = %event.aggregate_id,
            "Event inserted into outbox"
        );

        Ok(())
    }

    async fn begin_claim(
        &self,
        limit: i32,
    ) -> OutboxResult<(Transaction<'static, Postgres>, Vec<OutboxEvent>)> {
        let mut tx = self.pool.begin().await.context("Failed to begin claim transaction")?;

        let rows = sqlx::query(
            r#"
            SELECT
                id,
                aggregate_type,
                aggregate_id,
                event_type,
                payload,
                metadata,
                created_at,
                published_at,
                retry_count,
                last_error
            FROM outbox_events
            WHERE published_at IS NULL
            ORDER BY created_at ASC
            FOR UPDATE SKIP LOCKED
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *tx)
        .await
        .context("Failed to claim unpublished events")?;

        let events = rows
            .iter()
            .map(Self::row_to_event)
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .context("Failed to parse claimed events")?;

        debug!(count = events.len(), "Claimed unpublished events");

        Ok((tx, events))
    }

    async fn mark_published(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event_id: Uuid,
    ) -> OutboxResult<()> {
        let result = sqlx::query("UPDATE outbox_events SET published_at = NOW() WHERE id = $1")
            .bind(event_id)
            .execute(&mut **tx)
            .await
            .context("Failed to mark event as published")?;

        if result.rows_affected() == 0 {
            warn!(event_id = %event_id, "Event not found when marking as published");
            return Err(OutboxError::EventNotFound(event_id));
        }

        debug!(event_id = %event_id, "Event marked as published");
        Ok(())
    }

    async fn mark_failed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event_id: Uuid,
        error: &str,
    ) -> OutboxResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE outbox_events
            SET
                retry_count = retry_count + 1,
                last_error = $2
            WHERE id = $1
            "#,
        )
        .bind(event_id)
        .bind(error)
        .execute(&mut **tx)
        .await
        .context("Failed to mark event as failed")?;

        if result.rows_affected() == 0 {
            warn!(event_id = %event_id, "Event not found when marking as failed");
            return Err(OutboxError::EventNotFound(event_id));
        }

        warn!(event_id = %event_id, error = %error, "Event marked as failed");
        Ok(())
    }

    async fn pending_stats(&self) -> OutboxResult<(i64, i64)> {
        SqlxOutboxRepository::pending_stats(self).await
    }
}

/// Publisher trait for publishing events to the message broker.
///
/// Implementations should be idempotent to handle retries safely.
#[async_trait]
pub trait OutboxPublisher: Send + Sync {
    /// Publish an event to the message broker.
    async fn publish(&self, event: &OutboxEvent) -> OutboxResult<()>;
}

/// Where an outbox event is published: a single queue (default-exchange,
/// routed by queue name — correct when the event type has exactly one
/// subscriber) or a fanout exchange (every bound queue gets its own copy).
enum Destination {
    Queue(&'static str),
    FanoutExchange(&'static str),
}

/// AMQP-based implementation of OutboxPublisher.
///
/// Maps `event_type` to a fixed destination (not a topic-prefix convention —
/// the pipeline only has two cross-service event types) and publishes the
/// raw JSON payload as a persistent message.
pub struct AmqpOutboxPublisher {
    publisher: broker::Publisher,
}

impl AmqpOutboxPublisher {
    pub fn new(publisher: broker::Publisher) -> Self {
        Self { publisher }
    }

    /// Map event type to its AMQP destination.
    ///
    /// - "PAYMENT_REQUEST" -> queue "payment.requests" (one subscriber:
    ///   the Payments Inbox Consumer).
    /// - "PAYMENT_RESULT"  -> fanout exchange `broker::PAYMENT_RESULTS_EXCHANGE`
    ///   (two subscribers: Orders' status consumer, Notification's hub).
    fn destination_for(event_type: &str) -> Destination {
        match event_type {
            "PAYMENT_REQUEST" => Destination::Queue("payment.requests"),
            "PAYMENT_RESULT" => Destination::FanoutExchange(broker::PAYMENT_RESULTS_EXCHANGE),
            _ => Destination::Queue("unknown.events"),
        }
    }
}

#[async_trait]
impl OutboxPublisher for AmqpOutboxPublisher {
    async fn publish(&self, event: &OutboxEvent) -> OutboxResult<()> {
        let payload_bytes =
            serde_json::to_vec(&event.payload).context("Failed to serialize event payload")?;

        match Self::destination_for(&event.event_type) {
            Destination::Queue(queue) => {
                self.publisher
                    .publish(queue, &payload_bytes)
                    .await
                    .map_err(|e| OutboxError::PublishFailed(format!("broker publish failed: {}", e)))?;

                info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    queue = %queue,
                    "Event published to broker"
                );
            }
            Destination::FanoutExchange(exchange) => {
                self.publisher
                    .publish_fanout(exchange, &payload_bytes)
                    .await
                    .map_err(|e| OutboxError::PublishFailed(format!("broker fanout publish failed: {}", e)))?;

                info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    exchange = %exchange,
                    "Event published to broker fanout exchange"
                );
            }
        }

        Ok(())
    }
}

/// Background processor for publishing outbox events.
///
/// This component:
/// - Claims unpublished events with `FOR UPDATE SKIP LOCKED` at regular intervals
/// - Publishes events to the broker using the configured publisher
/// - Implements exponential backoff keyed on consecutive broker failures, capped at 30s
/// - Marks events as published or failed within the same transaction that claimed them
///
/// # Processing Guarantees
///
/// - **At-least-once delivery**: Events may be published multiple times if crashes occur
/// - **No double-claim**: `SKIP LOCKED` lets multiple dispatcher instances run concurrently
/// - **Automatic retries**: Failed events are retried indefinitely, rate-limited by backoff.
///   A deterministically-failing row stays `PENDING` forever; there is no automatic
///   skip, by design (a poisoned row needs manual intervention, not silent data loss).
pub struct OutboxProcessor<R: OutboxRepository, P: OutboxPublisher> {
    repository: Arc<R>,
    publisher: Arc<P>,
    batch_size: i32,
    poll_interval: Duration,
    consecutive_failures: AtomicU32,
    metrics: Option<crate::metrics::OutboxMetrics>,
}

impl<R: OutboxRepository, P: OutboxPublisher> OutboxProcessor<R, P> {
    /// Create a new outbox processor.
    pub fn new(repository: Arc<R>, publisher: Arc<P>, batch_size: i32, poll_interval: Duration) -> Self {
        Self {
            repository,
            publisher,
            batch_size,
            poll_interval,
            consecutive_failures: AtomicU32::new(0),
            metrics: None,
        }
    }

    /// Create a processor that also updates Prometheus metrics each polling cycle.
    pub fn new_with_metrics(
        repository: Arc<R>,
        publisher: Arc<P>,
        metrics: crate::metrics::OutboxMetrics,
        batch_size: i32,
        poll_interval: Duration,
    ) -> Self {
        Self {
            repository,
            publisher,
            batch_size,
            poll_interval,
            consecutive_failures: AtomicU32::new(0),
            metrics: Some(metrics),
        }
    }

    /// Start the processor loop.
    ///
    /// This method runs indefinitely, polling for events and publishing them.
    /// It should be spawned as a background task.
    pub async fn start(&self) -> Result<()> {
        info!(
            batch_size = self.batch_size,
            poll_interval_secs = self.poll_interval.as_secs(),
            "Outbox processor starting"
        );

        loop {
            match self.process_batch().await {
                Ok(count) => {
                    if count > 0 {
                        info!(published_count = count, "Published events from outbox");
                    } else {
                        debug!("No events to publish");
                    }
                }
                Err(e) => {
                    error!(error = ?e, "Outbox processor error");
                }
            }

            if let Some(metrics) = &self.metrics {
                if let Ok((pending, age)) = self.repository.pending_stats().await {
                    metrics.pending.set(pending);
                    metrics.oldest_pending_age_seconds.set(age);
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Claim a batch, publish each event, and commit the claiming transaction.
    ///
    /// Returns the number of successfully published events.
    async fn process_batch(&self) -> OutboxResult<i32> {
        let (mut tx, events) = self.repository.begin_claim(self.batch_size).await?;
        let mut published_count = 0;

        for event in events {
            let backoff_delay = self.calculate_backoff();
            if backoff_delay.as_secs() > 0 {
                debug!(
                    event_id = %event.id,
                    consecutive_failures = self.consecutive_failures.load(Ordering::Relaxed),
                    backoff_secs = backoff_delay.as_secs(),
                    "Applying broker backoff before publish"
                );
                tokio::time::sleep(backoff_delay).await;
            }

            match self.publisher.publish(&event).await {
                Ok(_) => {
                    self.consecutive_failures.store(0, Ordering::Relaxed);

                    if let Err(e) = self.repository.mark_published(&mut tx, event.id).await {
                        error!(
                            event_id = %event.id,
                            error = ?e,
                            "Failed to mark event as published (event was already delivered to the broker)"
                        );
                    } else {
                        published_count += 1;
                        if let Some(metrics) = &self.metrics {
                            metrics.published.inc();
                        }
                    }
                }
                Err(e) => {
                    self.consecutive_failures.fetch_add(1, Ordering::Relaxed);

                    error!(
                        event_id = %event.id,
                        event_type = %event.event_type,
                        retry_count = event.retry_count,
                        error = ?e,
                        "Failed to publish event"
                    );

                    if let Err(mark_err) =
                        self.repository.mark_failed(&mut tx, event.id, &e.to_string()).await
                    {
                        error!(event_id = %event.id, error = ?mark_err, "Failed to mark event as failed");
                    }
                }
            }
        }

        tx.commit().await.context("Failed to commit claimed batch")?;
        Ok(published_count)
    }

    /// Exponential backoff keyed on consecutive broker failures across the
    /// whole processor, not on any single row's retry count — a broker
    /// outage should throttle the dispatcher uniformly rather than let rows
    /// race each other back into the backoff window at different times.
    ///
    /// Strategy: 2^consecutive_failures seconds, capped at 30 seconds.
    fn calculate_backoff(&self) -> Duration {
        const MAX_BACKOFF_SECS: u64 = 30;

        let failures = self.consecutive_failures.load(Ordering::Relaxed);
        if failures == 0 {
            return Duration::from_secs(0);
        }

        let backoff_secs = 2u64.saturating_pow(failures.min(10)).min(MAX_BACKOFF_SECS);
        Duration::from_secs(backoff_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakePublisher {
        fail: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl OutboxPublisher for FakePublisher {
        async fn publish(&self, _event: &OutboxEvent) -> OutboxResult<()> {
            if self.fail.load(Ordering::Relaxed) {
                Err(OutboxError::PublishFailed("simulated failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct FakeRepository;

    #[async_trait]
    impl OutboxRepository for FakeRepository {
        async fn insert(&self, _tx: &mut Transaction<'_, Postgres>, _event: &OutboxEvent) -> OutboxResult<()> {
            unimplemented!("not exercised by these unit tests")
        }

        async fn begin_claim(
            &self,
            _limit: i32,
        ) -> OutboxResult<(Transaction<'static, Postgres>, Vec<OutboxEvent>)> {
            unimplemented!("not exercised by these unit tests")
        }

        async fn mark_published(&self, _tx: &mut Transaction<'_, Postgres>, _event_id: Uuid) -> OutboxResult<()> {
            unimplemented!("not exercised by these unit tests")
        }

        async fn mark_failed(
            &self,
            _tx: &mut Transaction<'_, Postgres>,
            _event_id: Uuid,
            _error: &str,
        ) -> OutboxResult<()> {
            unimplemented!("not exercised by these unit tests")
        }

        async fn pending_stats(&self) -> OutboxResult<(i64, i64)> {
            Ok((0, 0))
        }
    }

    #[test]
    fn test_backoff_calculation() {
        let repo = Arc::new(FakeRepository);
        let publisher = Arc::new(FakePublisher {
            fail: std::sync::atomic::AtomicBool::new(false),
        });
        let processor = OutboxProcessor::new(repo, publisher, 10, Duration::from_secs(1));

        assert_eq!(processor.calculate_backoff().as_secs(), 0);

        processor.consecutive_failures.store(1, Ordering::Relaxed);
        assert_eq!(processor.calculate_backoff().as_secs(), 2);

        processor.consecutive_failures.store(2, Ordering::Relaxed);
        assert_eq!(processor.calculate_backoff().as_secs(), 4);

        processor.consecutive_failures.store(5, Ordering::Relaxed);
        assert_eq!(processor.calculate_backoff().as_secs(), 30); // capped

        processor.consecutive_failures.store(20, Ordering::Relaxed);
        assert_eq!(processor.calculate_backoff().as_secs(), 30); // stays capped
    }

    #[test]
    fn test_destination_mapping() {
        // destination_for is private but this test module is nested inside
        // the crate, so it can call it directly without constructing a
        // publisher (which would require a live broker channel).
        assert!(matches!(
            AmqpOutboxPublisher::destination_for("PAYMENT_REQUEST"),
            Destination::Queue("payment.requests")
        ));
        assert!(matches!(
            AmqpOutboxPublisher::destination_for("PAYMENT_RESULT"),
            Destination::FanoutExchange(broker::PAYMENT_RESULTS_EXCHANGE)
        ));
        assert!(matches!(
            AmqpOutboxPublisher::destination_for("SOMETHING_ELSE"),
            Destination::Queue("unknown.events")
        ));
    }
}
