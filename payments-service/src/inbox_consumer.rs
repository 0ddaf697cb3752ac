//! Payments Inbox Consumer: drains `payment.requests`, debits the ledger at
//! most once per order, and emits a `PAYMENT_RESULT` outbox row (§4.3).
//!
//! Grounded on `inbox_processor.cpp`'s `handle_payment_request` step order
//! (dedup check, inbox insert, debit, inbox finalize, outbox insert, commit),
//! generalized to go through `inbox_consumer::claim_event`/`finalize_event`
//! and `transactional_outbox::SqlxOutboxRepository::insert` instead of raw
//! SQL, and to use `broker::Consumer`'s bounded-timeout poll loop (§5,
//! Cancellation & timeouts) instead of the original's blocking `consume`.

use std::time::Duration;

use chrono::Utc;
use error_types::{PipelineAction, PipelineError};
use inbox_consumer::{claim_event, finalize_event, ClaimOutcome, EventStatus};
use sqlx::PgPool;
use transactional_outbox::{OutboxEvent, OutboxRepository, SqlxOutboxRepository};
use uuid::Uuid;

use crate::ledger::{DebitOutcome, Ledger};
use crate::models::{PaymentRequest, PaymentResult};

pub struct InboxConsumerLoop {
    pool: PgPool,
    ledger: Ledger,
    outbox: SqlxOutboxRepository,
    consumer: broker::Consumer,
    backoff: broker::ConsumeBackoff,
}

impl InboxConsumerLoop {
    pub fn new(pool: PgPool, ledger: Ledger, consumer: broker::Consumer) -> Self {
        let outbox = SqlxOutboxRepository::new(pool.clone());
        Self { pool, ledger, outbox, consumer, backoff: broker::ConsumeBackoff::new() }
    }

    /// Runs indefinitely, polling `payment.requests` with a bounded timeout
    /// so this can be spawned as a background task without blocking forever.
    /// Consume failures (e.g. the broker connection dropping) back off
    /// exponentially instead of busy-looping.
    pub async fn run(&mut self) -> ! {
        loop {
            match self.consumer.next_with_timeout(Duration::from_secs(1)).await {
                Ok(Some(delivery)) => {
                    self.backoff.record_success();
                    if let Err(e) = self.handle_delivery(&delivery).await {
                        match e.pipeline_action() {
                            PipelineAction::Nack => {
                                tracing::warn!(error = ?e, "transient failure handling payment request, nacking for redelivery");
                                if let Err(nack_err) = self.consumer.nack_requeue(&delivery).await {
                                    tracing::error!(error = ?nack_err, "failed to nack delivery");
                                }
                                continue;
                            }
                            PipelineAction::AckDiscard | PipelineAction::Terminal => {
                                tracing::error!(error = ?e, "discarding payment request after terminal failure");
                            }
                        }
                    }

                    if let Err(ack_err) = self.consumer.ack(&delivery).await {
                        tracing::error!(error = ?ack_err, "failed to ack delivery");
                    }
                }
                Ok(None) => {
                    self.backoff.record_success();
                    continue;
                }
                Err(e) => {
                    let delay = self.backoff.record_failure();
                    tracing::error!(error = ?e, delay_secs = delay.as_secs(), "broker consume error, backing off");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn handle_delivery(&self, delivery: &broker::Delivery) -> Result<(), PipelineError> {
        let payload: serde_json::Value =
            serde_json::from_slice(&delivery.data).map_err(PipelineError::from)?;
        let request: PaymentRequest =
            serde_json::from_value(payload.clone()).map_err(PipelineError::from)?;

        let event_id = request.order_id.to_string();

        let mut tx = self.pool.begin().await.map_err(PipelineError::from)?;

        let outcome = claim_event(&mut tx, &event_id, "PAYMENT_REQUEST", &payload)
            .await
            .map_err(|e| PipelineError::TransientDatabase(e.to_string()))?;

        if outcome == ClaimOutcome::AlreadyClaimed {
            tx.commit().await.map_err(PipelineError::from)?;
            tracing::debug!(order_id = %event_id, "payment request already processed, skipping redelivery");
            return Ok(());
        }

        let debit_outcome = match self
            .ledger
            .read_version_in_tx(&mut tx, &request.user_id)
            .await
        {
            Ok(version) => self
                .ledger
                .debit_in_tx(&mut tx, &request.user_id, request.amount, version)
                .await?,
            Err(PipelineError::NotFound(_)) => DebitOutcome::Rejected,
            Err(e) => return Err(e),
        };

        let success = debit_outcome == DebitOutcome::Applied;
        let finalize_status = if success { EventStatus::Processed } else { EventStatus::Failed };

        finalize_event(&mut tx, &event_id, finalize_status)
            .await
            .map_err(|e| PipelineError::TransientDatabase(e.to_string()))?;

        let result = PaymentResult {
            order_id: request.order_id,
            user_id: request.user_id.clone(),
            success,
            message: if success {
                "Payment successful".to_string()
            } else {
                "Payment failed".to_string()
            },
        };

        let event = OutboxEvent {
            id: Uuid::new_v4(),
            aggregate_type: "payment".to_string(),
            aggregate_id: request.order_id,
            event_type: "PAYMENT_RESULT".to_string(),
            payload: serde_json::to_value(&result).map_err(PipelineError::from)?,
            metadata: None,
            created_at: Utc::now(),
            published_at: None,
            retry_count: 0,
            last_error: None,
        };

        self.outbox
            .insert(&mut tx, &event)
            .await
            .map_err(|e| PipelineError::TransientDatabase(e.to_string()))?;

        tx.commit().await.map_err(PipelineError::from)?;

        tracing::info!(order_id = %event_id, success, "payment request processed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_payment_request_deserializes_from_outbox_payload() {
        let req = PaymentRequest {
            order_id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            amount: Decimal::new(4000, 2),
        };
        let payload = serde_json::to_value(&req).unwrap();
        let decoded: PaymentRequest = serde_json::from_value(payload).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn test_result_message_reflects_debit_outcome() {
        let success_result = PaymentResult {
            order_id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            success: true,
            message: "Payment successful".to_string(),
        };
        assert!(success_result.success);

        let failed_result = PaymentResult {
            success: false,
            message: "Payment failed".to_string(),
            ..success_result
        };
        assert!(!failed_result.success);
    }
}
