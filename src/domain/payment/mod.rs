//! Payment domain - Gateway notification verification, parsing, recording.

pub mod answer;
pub mod errors;
pub mod processor;
pub mod record;
pub mod signature;

pub use answer::{GatewayAnswer, ParseError, STATUS_PAID};
pub use errors::CallbackError;
pub use processor::{CallbackChannel, CallbackOutcome, CallbackProcessor};
pub use record::{IdentityKey, PaymentRecord, DEFAULT_CURRENCY};
