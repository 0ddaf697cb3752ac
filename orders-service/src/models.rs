//! Order domain model and payment message schemas (§3).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An order's lifecycle status. Transitions only `NEW -> FINISHED` or
/// `NEW -> CANCELLED`, and only in reaction to a `PaymentResult` (Invariant 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    New,
    Finished,
    Cancelled,
}

impl OrderStatus {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "NEW",
            OrderStatus::Finished => "FINISHED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "NEW" => Some(OrderStatus::New),
            "FINISHED" => Some(OrderStatus::Finished),
            "CANCELLED" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: String,
    pub amount: Decimal,
    pub description: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Map a `orders` row into the typed model. Kept as a free function
    /// (rather than a `FromRow` derive) so the `status` column's `TEXT ->
    /// OrderStatus` conversion can fall back to `NEW` on unrecognised values
    /// instead of failing the whole query, matching the pattern used by
    /// `transactional_outbox::SqlxOutboxRepository::row_to_event`.
    pub fn from_row(row: &sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;

        let status_raw: String = row.try_get("status")?;
        Ok(Order {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            amount: row.try_get("amount")?,
            description: row.try_get("description")?,
            status: OrderStatus::from_db_str(&status_raw).unwrap_or(OrderStatus::New),
            created_at: row.try_get("created_at")?,
        })
    }
}

/// `PaymentRequest` message, published by the Order Writer's outbox and
/// consumed by the Payments Inbox Consumer (§3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRequest {
    pub order_id: Uuid,
    pub user_id: String,
    pub amount: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trip() {
        for status in [OrderStatus::New, OrderStatus::Finished, OrderStatus::Cancelled] {
            let s = status.as_db_str();
            assert_eq!(OrderStatus::from_db_str(s), Some(status));
        }
    }

    #[test]
    fn test_order_status_unknown_value_is_none() {
        assert_eq!(OrderStatus::from_db_str("BOGUS"), None);
    }

    #[test]
    fn test_payment_request_round_trip() {
        let req = PaymentRequest {
            order_id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            amount: Decimal::new(4000, 2),
        };
        let json = serde_json::to_string(&req).unwrap();
        let decoded: PaymentRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req, decoded);
    }

    #[test]
    fn test_order_serializes_status_as_uppercase() {
        let order = Order {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            amount: Decimal::new(100, 2),
            description: "widget".to_string(),
            status: OrderStatus::Finished,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["status"], "FINISHED");
    }
}
