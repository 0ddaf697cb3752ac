//! HTTP routes for the Order Writer (§5).
//!
//! Grounded on auth-service's handler shape: thin `web::Data<T>` + `web::Json<T>`
//! functions returning `Result<HttpResponse, PipelineError>`, letting
//! `PipelineError`'s `ResponseError` impl translate to the wire response.

use actix_web::{web, HttpResponse};
use error_types::PipelineError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Order, OrderStatus};
use crate::order_service::OrderService;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: String,
    pub amount: Decimal,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: String,
    pub amount: Decimal,
    pub description: String,
    pub status: OrderStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            user_id: order.user_id,
            amount: order.amount,
            description: order.description,
            status: order.status,
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub user_id: String,
}

pub async fn create_order(
    service: web::Data<OrderService>,
    payload: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, PipelineError> {
    let req = payload.into_inner();
    let order = service.create(req.user_id, req.amount, req.description).await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

pub async fn get_order(
    service: web::Data<OrderService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, PipelineError> {
    let order = service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

pub async fn list_orders(
    service: web::Data<OrderService>,
    query: web::Query<ListOrdersQuery>,
) -> Result<HttpResponse, PipelineError> {
    let orders = service.list_by_user(&query.user_id).await?;
    let response: Vec<OrderResponse> = orders.into_iter().map(OrderResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_response_carries_status() {
        let order = Order {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            amount: Decimal::new(500, 2),
            description: "desc".to_string(),
            status: OrderStatus::New,
            created_at: chrono::Utc::now(),
        };
        let response = OrderResponse::from(order.clone());
        assert_eq!(response.id, order.id);
        assert_eq!(response.status, OrderStatus::New);
    }
}
