//! Ledger account model and payment message schemas (§3).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub user_id: String,
    pub balance: Decimal,
    pub version: i32,
}

impl Account {
    pub fn from_row(row: &sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;

        Ok(Account {
            user_id: row.try_get("user_id")?,
            balance: row.try_get("balance")?,
            version: row.try_get("version")?,
        })
    }
}

/// `PaymentRequest` message, consumed from the Order Writer's outbox by the
/// Inbox Consumer (§3). Mirrors `orders_service::models::PaymentRequest` —
/// each service owns its side of the wire schema rather than sharing a crate
/// for a two-field message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentRequest {
    pub order_id: Uuid,
    pub user_id: String,
    pub amount: Decimal,
}

/// `PaymentResult` message, published by the Payments Inbox Consumer's
/// result outbox row and consumed by the Notification service (§3).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentResult {
    pub order_id: Uuid,
    pub user_id: String,
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_payment_result_round_trip() {
        let result = PaymentResult {
            order_id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            success: true,
            message: "Payment successful".to_string(),
        };
        let json = serde_json::to_string(&result).unwrap();
        let decoded: PaymentResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, decoded);
    }

    #[test]
    fn test_account_equality() {
        let a = Account {
            user_id: "u1".to_string(),
            balance: Decimal::new(1000, 2),
            version: 3,
        };
        let b = a.clone();
        assert_eq!(a, b);
    }
}
