//! HTTP adapters (Axum).

pub mod payments;
