//! HTTP routes for account management (§5). Payment results flow entirely
//! through the outbox/broker path, not HTTP — there is no "process payment"
//! endpoint, matching `main.cpp`'s surface.

use actix_web::{web, HttpResponse};
use error_types::PipelineError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::Ledger;
use crate::models::Account;

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub user_id: String,
    pub balance: Decimal,
    pub version: i32,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        AccountResponse {
            user_id: account.user_id,
            balance: account.balance,
            version: account.version,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub user_id: String,
    pub balance: Decimal,
}

pub async fn create_account(
    ledger: web::Data<Ledger>,
    payload: web::Json<CreateAccountRequest>,
) -> Result<HttpResponse, PipelineError> {
    let account = ledger.create_account(&payload.user_id).await?;
    Ok(HttpResponse::Created().json(AccountResponse::from(account)))
}

pub async fn deposit(
    ledger: web::Data<Ledger>,
    path: web::Path<String>,
    payload: web::Json<DepositRequest>,
) -> Result<HttpResponse, PipelineError> {
    let account = ledger.deposit(&path.into_inner(), payload.amount).await?;
    Ok(HttpResponse::Ok().json(AccountResponse::from(account)))
}

pub async fn get_balance(
    ledger: web::Data<Ledger>,
    path: web::Path<String>,
) -> Result<HttpResponse, PipelineError> {
    let user_id = path.into_inner();
    let balance = ledger.get_balance(&user_id).await?;
    Ok(HttpResponse::Ok().json(BalanceResponse { user_id, balance }))
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_response_carries_version() {
        let account = Account {
            user_id: "u1".to_string(),
            balance: Decimal::new(1000, 2),
            version: 2,
        };
        let response = AccountResponse::from(account);
        assert_eq!(response.version, 2);
    }
}
