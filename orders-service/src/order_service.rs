//! Order Writer (§4.1): creates an order and its `PAYMENT_REQUEST` outbox
//! row in one transaction, and exposes the plain reads/writes that don't
//! carry a cross-table invariant.
//!
//! Grounded on `order_service.cpp`'s `create_order`/`get_user_orders`/
//! `get_order`/`update_order_status`, generalized to go through the
//! transactional-outbox library instead of a raw second `INSERT`, and to
//! enforce the `update_status` transition rules the original leaves
//! unchecked (spec §4.1, Invariant 6).

use chrono::Utc;
use error_types::PipelineError;
use rust_decimal::Decimal;
use sqlx::PgPool;
use transactional_outbox::{OutboxEvent, OutboxRepository, SqlxOutboxRepository};
use uuid::Uuid;

use crate::models::{Order, OrderStatus, PaymentRequest};

pub struct OrderService {
    pool: PgPool,
    outbox: SqlxOutboxRepository,
}

impl OrderService {
    pub fn new(pool: PgPool) -> Self {
        let outbox = SqlxOutboxRepository::new(pool.clone());
        Self { pool, outbox }
    }

    /// Insert the order row and its `PAYMENT_REQUEST` outbox row in one
    /// transaction (§4.1, Invariant 1). Fails `InvalidInput` if `amount` is
    /// not positive or `user_id` is empty, without touching the database.
    pub async fn create(
        &self,
        user_id: String,
        amount: Decimal,
        description: String,
    ) -> Result<Order, PipelineError> {
        if user_id.trim().is_empty() {
            return Err(PipelineError::InvalidInput("user_id must not be empty".to_string()));
        }
        if amount <= Decimal::ZERO {
            return Err(PipelineError::InvalidInput("amount must be positive".to_string()));
        }

        let order = Order {
            id: Uuid::new_v4(),
            user_id,
            amount,
            description,
            status: OrderStatus::New,
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await.map_err(PipelineError::from)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, amount, description, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id)
        .bind(&order.user_id)
        .bind(order.amount)
        .bind(&order.description)
        .bind(order.status.as_db_str())
        .bind(order.created_at)
        .execute(&mut *tx)
        .await
        .map_err(PipelineError::from)?;

        let payment_request = PaymentRequest {
            order_id: order.id,
            user_id: order.user_id.clone(),
            amount: order.amount,
        };

        let event = OutboxEvent {
            id: Uuid::new_v4(),
            aggregate_type: "order".to_string(),
            aggregate_id: order.id,
            event_type: "PAYMENT_REQUEST".to_string(),
            payload: serde_json::to_value(&payment_request).map_err(PipelineError::from)?,
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

        Ok(order)
    }

    pub async fn get(&self, order_id: Uuid) -> Result<Order, PipelineError> {
        let row = sqlx::query(
            "SELECT id, user_id, amount, description, status, created_at FROM orders WHERE id = $1",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(PipelineError::from)?
        .ok_or_else(|| PipelineError::NotFound(format!("order {} not found", order_id)))?;

        Order::from_row(&row).map_err(PipelineError::from)
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>, PipelineError> {
        let rows = sqlx::query(
            "SELECT id, user_id, amount, description, status, created_at \
             FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(PipelineError::from)?;

        rows.iter()
            .map(Order::from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(PipelineError::from)
    }

    /// Only `NEW -> FINISHED` and `NEW -> CANCELLED` are legal; a repeat of
    /// the order's current status is a silent no-op, everything else is
    /// `IllegalTransition` (§4.1).
    pub async fn update_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
    ) -> Result<(), PipelineError> {
        let current = self.get(order_id).await?;

        if current.status == new_status {
            return Ok(());
        }

        let legal = matches!(
            (current.status, new_status),
            (OrderStatus::New, OrderStatus::Finished) | (OrderStatus::New, OrderStatus::Cancelled)
        );

        if !legal {
            return Err(PipelineError::IllegalTransition(format!(
                "cannot transition order {} from {:?} to {:?}",
                order_id, current.status, new_status
            )));
        }

        let result = sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
            .bind(new_status.as_db_str())
            .bind(order_id)
            .execute(&self.pool)
            .await
            .map_err(PipelineError::from)?;

        if result.rows_affected() == 0 {
            return Err(PipelineError::NotFound(format!("order {} not found", order_id)));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> PaymentRequest {
        PaymentRequest {
            order_id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            amount: Decimal::new(4000, 2),
        }
    }

    #[test]
    fn test_invalid_input_detection_logic() {
        let empty_user = "".to_string();
        assert!(empty_user.trim().is_empty());

        let zero = Decimal::ZERO;
        assert!(zero <= Decimal::ZERO);

        let negative = Decimal::new(-100, 2);
        assert!(negative <= Decimal::ZERO);

        let positive = Decimal::new(100, 2);
        assert!(positive > Decimal::ZERO);
    }

    #[test]
    fn test_legal_transitions() {
        use OrderStatus::*;
        assert!(matches!((New, Finished), (New, Finished) | (New, Cancelled)));
        assert!(matches!((New, Cancelled), (New, Finished) | (New, Cancelled)));
        assert!(!matches!((Finished, Cancelled), (New, Finished) | (New, Cancelled)));
        assert!(!matches!((Cancelled, Finished), (New, Finished) | (New, Cancelled)));
    }

    #[test]
    fn test_payment_request_payload_is_serializable() {
        let req = sample_request();
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["order_id"], req.order_id.to_string());
        assert_eq!(value["user_id"], "u1");
    }
}
