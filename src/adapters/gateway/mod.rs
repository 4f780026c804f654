//! Payment gateway adapters.

mod izipay_client;

pub use izipay_client::{FormToken, FormTokenRequest, IzipayClient};
