//! Durable payment records and their deduplication key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::answer::GatewayAnswer;

/// Fixed currency for stored amounts (minor units).
pub const DEFAULT_CURRENCY: &str = "PEN";

/// A recorded payment notification.
///
/// Created on the first verified notification for a given identity key and
/// updated in place on every later one carrying the same key. Never deleted
/// by this subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Internal record id.
    pub id: Uuid,

    /// Gateway transaction uuid, when the answer carried one.
    pub transaction_id: Option<String>,

    /// Merchant order reference, when the answer carried one.
    pub order_reference: Option<String>,

    /// Gateway order status as last reported.
    pub status: String,

    /// Paid amount in minor currency units.
    pub amount: i64,

    /// Currency code (fixed default).
    pub currency: String,

    /// Payer email, when known.
    pub customer_email: Option<String>,

    /// Full answer payload snapshot for audit.
    pub raw_answer: Value,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The natural key used to deduplicate notifications.
///
/// The transaction uuid wins over the order reference. A notification
/// carrying neither cannot be deduplicated and is inserted unconditionally
/// (accepted data-quality gap).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityKey {
    Transaction(String),
    OrderReference(String),
    None,
}

impl IdentityKey {
    /// Derives the identity key from a parsed answer.
    pub fn from_answer(answer: &GatewayAnswer) -> Self {
        if let Some(txn) = &answer.transaction_id {
            IdentityKey::Transaction(txn.clone())
        } else if let Some(order) = &answer.order_reference {
            IdentityKey::OrderReference(order.clone())
        } else {
            IdentityKey::None
        }
    }

    /// Storage representation: a prefixed string, or `None` when the answer
    /// cannot be deduplicated. The prefix keeps transaction uuids and order
    /// references from colliding in one unique index.
    pub fn as_storage_key(&self) -> Option<String> {
        match self {
            IdentityKey::Transaction(txn) => Some(format!("txn:{}", txn)),
            IdentityKey::OrderReference(order) => Some(format!("ord:{}", order)),
            IdentityKey::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(json: &str) -> GatewayAnswer {
        GatewayAnswer::parse(json).unwrap()
    }

    #[test]
    fn identity_key_prefers_transaction_uuid() {
        let key = IdentityKey::from_answer(&answer(
            r#"{"orderStatus":"PAID","orderId":"ORD-1","transactions":[{"uuid":"T-1"}]}"#,
        ));
        assert_eq!(key, IdentityKey::Transaction("T-1".to_string()));
        assert_eq!(key.as_storage_key().as_deref(), Some("txn:T-1"));
    }

    #[test]
    fn identity_key_falls_back_to_order_reference() {
        let key = IdentityKey::from_answer(&answer(r#"{"orderStatus":"PAID","orderId":"ORD-1"}"#));
        assert_eq!(key, IdentityKey::OrderReference("ORD-1".to_string()));
        assert_eq!(key.as_storage_key().as_deref(), Some("ord:ORD-1"));
    }

    #[test]
    fn identity_key_absent_when_neither_present() {
        let key = IdentityKey::from_answer(&answer(r#"{"orderStatus":"PAID"}"#));
        assert_eq!(key, IdentityKey::None);
        assert!(key.as_storage_key().is_none());
    }

    #[test]
    fn storage_key_prefixes_prevent_collisions() {
        let txn = IdentityKey::Transaction("X".to_string());
        let ord = IdentityKey::OrderReference("X".to_string());
        assert_ne!(txn.as_storage_key(), ord.as_storage_key());
    }
}
