//! Order Status Consumer: drains `payment.results` and mutates the owning
//! order's status, the only place Invariant 6 ("no order status transitions
//! out of `NEW` except in reaction to a `PaymentResult`") is actually
//! enforced against the `orders` table.
//!
//! Grounded on the same consumer shape as
//! `notification_service::consumer::ResultConsumer` (§4.4's `main.cpp`
//! consumer thread) and `websocket_server.cpp`'s `success -> FINISHED` /
//! `failure -> CANCELLED` mapping — the orders table lives in this service,
//! so only this service can apply that transition, even though neither the
//! distilled spec nor `websocket-service/src/main.cpp` names the component
//! that is supposed to do it. Malformed deliveries are logged and acked, not
//! retried (§7, `Malformed` broker messages are discarded).

use std::time::Duration;

use serde::Deserialize;
use uuid::Uuid;

use crate::models::OrderStatus;
use crate::order_service::OrderService;
use error_types::{PipelineAction, PipelineError};

#[derive(Debug, Deserialize)]
struct PaymentResultMessage {
    order_id: Uuid,
    #[allow(dead_code)]
    user_id: String,
    success: bool,
    #[serde(default)]
    #[allow(dead_code)]
    message: String,
}

pub struct StatusConsumer {
    order_service: OrderService,
    consumer: broker::Consumer,
    backoff: broker::ConsumeBackoff,
}

impl StatusConsumer {
    pub fn new(order_service: OrderService, consumer: broker::Consumer) -> Self {
        Self { order_service, consumer, backoff: broker::ConsumeBackoff::new() }
    }

    /// Runs indefinitely, polling `payment.results` with a bounded timeout
    /// (§5, Cancellation & timeouts). Consume failures back off exponentially
    /// instead of busy-looping when the broker connection drops.
    pub async fn run(&mut self) -> ! {
        loop {
            match self.consumer.next_with_timeout(Duration::from_secs(1)).await {
                Ok(Some(delivery)) => {
                    self.backoff.record_success();
                    if let Err(e) = self.handle_delivery(&delivery.data).await {
                        match e.pipeline_action() {
                            PipelineAction::Nack => {
                                tracing::warn!(error = ?e, "transient failure applying order status transition, nacking for redelivery");
                                if let Err(nack_err) = self.consumer.nack_requeue(&delivery).await {
                                    tracing::error!(error = ?nack_err, "failed to nack payment.results delivery");
                                }
                                continue;
                            }
                            PipelineAction::AckDiscard | PipelineAction::Terminal => {
                                tracing::error!(error = ?e, "discarding payment.results delivery after terminal failure");
                            }
                        }
                    }

                    if let Err(e) = self.consumer.ack(&delivery).await {
                        tracing::error!(error = ?e, "failed to ack payment.results delivery");
                    }
                }
                Ok(None) => {
                    self.backoff.record_success();
                    continue;
                }
                Err(e) => {
                    let delay = self.backoff.record_failure();
                    tracing::error!(error = ?e, delay_secs = delay.as_secs(), "broker consume error on payment.results, backing off");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn handle_delivery(&self, data: &[u8]) -> Result<(), PipelineError> {
        let result: PaymentResultMessage = match serde_json::from_slice(data) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed payment result message");
                return Ok(());
            }
        };

        let new_status =
            if result.success { OrderStatus::Finished } else { OrderStatus::Cancelled };

        match self.order_service.update_status(result.order_id, new_status).await {
            Ok(()) => {
                tracing::info!(order_id = %result.order_id, status = ?new_status, "order status updated from payment result");
                Ok(())
            }
            Err(PipelineError::NotFound(_)) => {
                tracing::warn!(order_id = %result.order_id, "payment result for unknown order, discarding");
                Ok(())
            }
            Err(PipelineError::IllegalTransition(msg)) => {
                tracing::warn!(order_id = %result.order_id, error = %msg, "ignoring illegal order status transition");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_maps_to_finished() {
        let result = PaymentResultMessage {
            order_id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            success: true,
            message: "Payment successful".to_string(),
        };
        let status = if result.success { OrderStatus::Finished } else { OrderStatus::Cancelled };
        assert_eq!(status, OrderStatus::Finished);
    }

    #[test]
    fn test_failure_maps_to_cancelled() {
        let result = PaymentResultMessage {
            order_id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            success: false,
            message: "Payment failed".to_string(),
        };
        let status = if result.success { OrderStatus::Finished } else { OrderStatus::Cancelled };
        assert_eq!(status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_malformed_payload_is_rejected() {
        let bad = b"not json";
        let parsed: Result<PaymentResultMessage, _> = serde_json::from_slice(bad);
        assert!(parsed.is_err());
    }
}
