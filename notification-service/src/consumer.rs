//! Background task draining `payment.results` and pushing `order_update`
//! frames through the hub (§4.4).
//!
//! Grounded on `main.cpp`'s consumer thread: parse the `PaymentResult`
//! payload, map `success` to `FINISHED`/`CANCELLED`, and notify by order id.
//! Malformed messages are logged and acked, not retried — there is no
//! "terminal PaymentResult" to emit downstream of this service.

use std::time::Duration;

use actix::Addr;
use serde::Deserialize;
use uuid::Uuid;

use crate::hub::{NotificationHub, Notify};
use crate::models::OrderUpdateFrame;

#[derive(Debug, Deserialize)]
struct PaymentResultMessage {
    order_id: Uuid,
    success: bool,
    #[serde(default)]
    message: String,
}

pub struct ResultConsumer {
    hub: Addr<NotificationHub>,
    consumer: broker::Consumer,
    backoff: broker::ConsumeBackoff,
}

impl ResultConsumer {
    pub fn new(hub: Addr<NotificationHub>, consumer: broker::Consumer) -> Self {
        Self { hub, consumer, backoff: broker::ConsumeBackoff::new() }
    }

    /// Runs indefinitely, polling `payment.results` with a bounded timeout.
    /// Consume failures back off exponentially instead of busy-looping when
    /// the broker connection drops.
    pub async fn run(&mut self) -> ! {
        loop {
            match self.consumer.next_with_timeout(Duration::from_secs(1)).await {
                Ok(Some(delivery)) => {
                    self.backoff.record_success();
                    self.handle_delivery(&delivery.data);

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

    fn handle_delivery(&self, data: &[u8]) {
        let result: PaymentResultMessage = match serde_json::from_slice(data) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed payment result message");
                return;
            }
        };

        let order_id = result.order_id.to_string();
        let frame = OrderUpdateFrame::from_payment_result(
            order_id.clone(),
            result.success,
            result.message,
            chrono::Utc::now().timestamp(),
        );

        self.hub.do_send(Notify { order_id, frame });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_payload_is_rejected() {
        let bad = b"not json";
        let parsed: Result<PaymentResultMessage, _> = serde_json::from_slice(bad);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_well_formed_payload_parses() {
        let order_id = Uuid::new_v4();
        let json = serde_json::json!({
            "order_id": order_id,
            "user_id": "u1",
            "success": true,
            "message": "Payment successful",
        });
        let parsed: PaymentResultMessage = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.order_id, order_id);
        assert!(parsed.success);
    }
}
