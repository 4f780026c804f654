//! Ports - trait interfaces between the domain and the outside world.

mod notification_dispatcher;
mod order_service;
mod payment_record_store;

pub use notification_dispatcher::{NotificationDispatcher, NotifyError};
pub use order_service::{OrderService, PendingOrder};
pub use payment_record_store::{PaymentRecordStore, UpsertOutcome};
