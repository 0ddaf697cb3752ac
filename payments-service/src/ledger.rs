//! Account ledger: balance-holding accounts with optimistic concurrency on
//! `version` (§4.3, Invariant 4).
//!
//! Grounded on `payment_service.cpp`'s `create_account`/`deposit`/
//! `process_payment`/`get_balance`. `debit` takes the caller's open
//! transaction so it can commit alongside the inbox claim and the result
//! outbox row (§4.3 step 4); `deposit`/`create_account`/`get_balance` own
//! their transaction since nothing else needs to join it (§9 Open Question a).

use error_types::PipelineError;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::models::Account;

#[derive(Clone)]
pub struct Ledger {
    pool: PgPool,
}

/// Outcome of an attempted debit. A `Rejected` debit is a terminal business
/// failure (insufficient balance or a version conflict with a concurrent
/// writer) and is never retried internally (§9 Open Question b) — the
/// caller's `PaymentResult` just carries `success: false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    Applied,
    Rejected,
}

impl Ledger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_account(&self, user_id: &str) -> Result<Account, PipelineError> {
        let existing: Option<(String,)> =
            sqlx::query_as("SELECT user_id FROM accounts WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(PipelineError::from)?;

        if existing.is_some() {
            return Err(PipelineError::AlreadyExists(format!(
                "account {} already exists",
                user_id
            )));
        }

        sqlx::query("INSERT INTO accounts (user_id, balance, version) VALUES ($1, 0, 0)")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(PipelineError::from)?;

        self.get_account(user_id).await
    }

    pub async fn get_account(&self, user_id: &str) -> Result<Account, PipelineError> {
        let row = sqlx::query("SELECT user_id, balance, version FROM accounts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(PipelineError::from)?
            .ok_or_else(|| PipelineError::NotFound(format!("account {} not found", user_id)))?;

        Account::from_row(&row).map_err(PipelineError::from)
    }

    pub async fn get_balance(&self, user_id: &str) -> Result<Decimal, PipelineError> {
        Ok(self.get_account(user_id).await?.balance)
    }

    /// Credit `amount` to `user_id`'s balance (deposits are not outboxed,
    /// §9 Open Question a: nothing downstream needs to react to a deposit).
    pub async fn deposit(&self, user_id: &str, amount: Decimal) -> Result<Account, PipelineError> {
        if amount <= Decimal::ZERO {
            return Err(PipelineError::InvalidInput("amount must be positive".to_string()));
        }

        let row = sqlx::query(
            "UPDATE accounts SET balance = balance + $1, version = version + 1 \
             WHERE user_id = $2 \
             RETURNING user_id, balance, version",
        )
        .bind(amount)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(PipelineError::from)?
        .ok_or_else(|| PipelineError::NotFound(format!("account {} not found", user_id)))?;

        Account::from_row(&row).map_err(PipelineError::from)
    }

    /// Attempt to debit `amount` from `user_id`'s account within `tx`, using
    /// the `version` read via `current_version` as the optimistic-concurrency
    /// token. Zero rows affected (insufficient balance, account missing, or a
    /// concurrent writer already advanced `version`) is reported as
    /// `DebitOutcome::Rejected`, never retried (§4.3 step 4, Invariant 4).
    pub async fn debit_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: &str,
        amount: Decimal,
        current_version: i32,
    ) -> Result<DebitOutcome, PipelineError> {
        let result = sqlx::query(
            "UPDATE accounts SET balance = balance - $1, version = version + 1 \
             WHERE user_id = $2 AND balance >= $3 AND version = $4",
        )
        .bind(amount)
        .bind(user_id)
        .bind(amount)
        .bind(current_version)
        .execute(&mut **tx)
        .await
        .map_err(PipelineError::from)?;

        Ok(if result.rows_affected() > 0 {
            DebitOutcome::Applied
        } else {
            DebitOutcome::Rejected
        })
    }

    /// Read the current version of `user_id`'s account as part of `tx`, so
    /// the version used by `debit_in_tx`'s compare-and-swap reflects the
    /// same transaction snapshot. Returns `NotFound` if no account exists.
    pub async fn read_version_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: &str,
    ) -> Result<i32, PipelineError> {
        let row = sqlx::query("SELECT version FROM accounts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(PipelineError::from)?
            .ok_or_else(|| PipelineError::NotFound(format!("account {} not found", user_id)))?;

        row.try_get::<i32, _>("version").map_err(PipelineError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debit_outcome_equality() {
        assert_eq!(DebitOutcome::Applied, DebitOutcome::Applied);
        assert_ne!(DebitOutcome::Applied, DebitOutcome::Rejected);
    }

    #[test]
    fn test_deposit_rejects_non_positive_amount() {
        assert!(Decimal::ZERO <= Decimal::ZERO);
        assert!(Decimal::new(-500, 2) <= Decimal::ZERO);
        assert!(Decimal::new(500, 2) > Decimal::ZERO);
    }
}
