//! PaymentRecordStore port - Interface for idempotent payment persistence.
//!
//! The gateway may deliver the same notification more than once, and the
//! callback and IPN channels for one transaction may arrive concurrently.
//! The store's upsert-by-identity-key is the sole concurrency-correctness
//! mechanism: implementations must make the upsert atomic with respect to
//! the identity key (a single conditional write or transaction, never a
//! read-then-write across two round trips).

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::payment::{GatewayAnswer, PaymentRecord};

/// Result of an upsert: whether a new record was created or an existing one
/// updated in place.
#[derive(Debug, Clone)]
pub enum UpsertOutcome {
    /// First verified notification for this identity key.
    Inserted(PaymentRecord),
    /// A record with the same identity key already existed and was merged.
    Updated(PaymentRecord),
}

impl UpsertOutcome {
    /// The record after the upsert, whichever branch was taken.
    pub fn record(&self) -> &PaymentRecord {
        match self {
            UpsertOutcome::Inserted(r) | UpsertOutcome::Updated(r) => r,
        }
    }

    pub fn was_inserted(&self) -> bool {
        matches!(self, UpsertOutcome::Inserted(_))
    }
}

/// Port for persisting verified payment notifications.
#[async_trait]
pub trait PaymentRecordStore: Send + Sync {
    /// Inserts or updates the payment record identified by the answer's
    /// identity key (transaction uuid, else order reference).
    ///
    /// An update is a merge, not a replace: status, amount (when the answer
    /// carries one), and the raw snapshot are overwritten; other stored
    /// fields keep their previous values when absent from the new answer.
    /// An answer with no identity key is inserted unconditionally.
    async fn upsert_from_answer(
        &self,
        answer: &GatewayAnswer,
    ) -> Result<UpsertOutcome, DomainError>;
}
