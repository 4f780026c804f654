//! Adapters - implementations of the ports against real infrastructure.

pub mod email;
pub mod gateway;
pub mod http;
pub mod postgres;
