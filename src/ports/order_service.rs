//! OrderService port - External order-management collaborator.
//!
//! Order domain logic lives outside this subsystem. The payment core only
//! needs to look up a pending order by its reference and promote it to a
//! confirmed order once payment is verified; both operations are delegated
//! through this port.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// A pending order awaiting payment, as exposed by the order service.
#[derive(Debug, Clone)]
pub struct PendingOrder {
    /// Merchant order reference, matches the gateway's order id.
    pub reference: String,

    /// Customer email on the order, when known.
    pub customer_email: Option<String>,

    /// Order total in minor currency units.
    pub total_minor: i64,
}

/// Port for the external order-management service.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Looks up a pending order by its merchant reference.
    async fn find_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<PendingOrder>, DomainError>;

    /// Creates a confirmed order from a pending one after payment.
    async fn create_confirmed(&self, order: &PendingOrder) -> Result<(), DomainError>;
}
