//! PostgreSQL implementation of PaymentRecordStore.
//!
//! Idempotency is enforced in the database, not in application code: the
//! `payments` table carries a nullable `identity_key` column with a unique
//! index, and the upsert is a single `INSERT ... ON CONFLICT (identity_key)
//! DO UPDATE`. Two concurrent deliveries of the same notification race on
//! the index and the loser merges instead of duplicating. Rows with a NULL
//! identity key never conflict, so answers without a transaction uuid or
//! order reference insert unconditionally.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::DomainError;
use crate::domain::payment::{GatewayAnswer, IdentityKey, PaymentRecord, DEFAULT_CURRENCY};
use crate::ports::{PaymentRecordStore, UpsertOutcome};

/// PostgreSQL implementation of the PaymentRecordStore port.
pub struct PostgresPaymentRecordRepository {
    pool: PgPool,
}

impl PostgresPaymentRecordRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment record.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    transaction_id: Option<String>,
    order_reference: Option<String>,
    status: String,
    amount: i64,
    currency: String,
    customer_email: Option<String>,
    raw_answer: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// True when the row was created by this statement (`xmax = 0`).
    inserted: bool,
}

impl From<PaymentRow> for PaymentRecord {
    fn from(row: PaymentRow) -> Self {
        PaymentRecord {
            id: row.id,
            transaction_id: row.transaction_id,
            order_reference: row.order_reference,
            status: row.status,
            amount: row.amount,
            currency: row.currency,
            customer_email: row.customer_email,
            raw_answer: row.raw_answer,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl PaymentRecordStore for PostgresPaymentRecordRepository {
    async fn upsert_from_answer(
        &self,
        answer: &GatewayAnswer,
    ) -> Result<UpsertOutcome, DomainError> {
        let identity_key = IdentityKey::from_answer(answer).as_storage_key();
        let now = Utc::now();

        // The DO UPDATE branch merges: status and the raw snapshot always
        // take the new value; amount and customer email keep the stored
        // value when the new answer omits them.
        let row: PaymentRow = sqlx::query_as(
            r#"
            INSERT INTO payments (
                id, identity_key, transaction_id, order_reference, status,
                amount, currency, customer_email, raw_answer, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, COALESCE($6, 0), $7, $8, $9, $10, $10)
            ON CONFLICT (identity_key) DO UPDATE SET
                status = EXCLUDED.status,
                amount = COALESCE($6, payments.amount),
                transaction_id = COALESCE(EXCLUDED.transaction_id, payments.transaction_id),
                order_reference = COALESCE(EXCLUDED.order_reference, payments.order_reference),
                customer_email = COALESCE(EXCLUDED.customer_email, payments.customer_email),
                raw_answer = EXCLUDED.raw_answer,
                updated_at = EXCLUDED.updated_at
            RETURNING id, transaction_id, order_reference, status, amount,
                      currency, customer_email, raw_answer, created_at, updated_at,
                      (xmax = 0) AS inserted
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&identity_key)
        .bind(&answer.transaction_id)
        .bind(&answer.order_reference)
        .bind(answer.status_label())
        .bind(answer.paid_amount)
        .bind(DEFAULT_CURRENCY)
        .bind(&answer.customer_email)
        .bind(&answer.raw)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to upsert payment: {}", e)))?;

        let inserted = row.inserted;
        let record = PaymentRecord::from(row);

        if inserted {
            Ok(UpsertOutcome::Inserted(record))
        } else {
            Ok(UpsertOutcome::Updated(record))
        }
    }
}
