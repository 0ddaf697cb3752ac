//! WebSocket wire protocol for order status notifications (§4.4).

use serde::{Deserialize, Serialize};

/// Client -> server subscribe frame: `{"type": "subscribe", "order_id": "..."}`.
/// Any other shape is silently dropped, matching the original gateway's
/// catch-all around frame parsing.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeFrame {
    #[serde(rename = "type")]
    pub frame_type: String,
    pub order_id: String,
}

/// Server -> client acknowledgement of a subscribe frame.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribedFrame {
    #[serde(rename = "type")]
    pub frame_type: &'static str,
    pub order_id: String,
}

impl SubscribedFrame {
    pub fn new(order_id: String) -> Self {
        Self { frame_type: "subscribed", order_id }
    }
}

/// Server -> client order status push, built from a `PaymentResult` event.
/// `success: true` maps to `FINISHED`, `success: false` maps to `CANCELLED`
/// (the Order Writer's only two terminal statuses, per the Order Writer's
/// `update_status` transition rules).
#[derive(Debug, Clone, Serialize)]
pub struct OrderUpdateFrame {
    #[serde(rename = "type")]
    pub frame_type: &'static str,
    pub order_id: String,
    pub status: &'static str,
    pub message: String,
    pub timestamp: i64,
}

impl OrderUpdateFrame {
    pub fn from_payment_result(order_id: String, success: bool, message: String, timestamp: i64) -> Self {
        Self {
            frame_type: "order_update",
            order_id,
            status: if success { "FINISHED" } else { "CANCELLED" },
            message,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_frame_parses() {
        let json = r#"{"type": "subscribe", "order_id": "abc-123"}"#;
        let frame: SubscribeFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.frame_type, "subscribe");
        assert_eq!(frame.order_id, "abc-123");
    }

    #[test]
    fn test_order_update_frame_maps_success_to_finished() {
        let frame = OrderUpdateFrame::from_payment_result(
            "abc-123".to_string(),
            true,
            "Payment successful".to_string(),
            1700000000,
        );
        assert_eq!(frame.status, "FINISHED");
    }

    #[test]
    fn test_order_update_frame_maps_failure_to_cancelled() {
        let frame = OrderUpdateFrame::from_payment_result(
            "abc-123".to_string(),
            false,
            "Payment failed".to_string(),
            1700000000,
        );
        assert_eq!(frame.status, "CANCELLED");
    }
}
