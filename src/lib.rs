//! Condor Booking - Tour Booking Backend
//!
//! This crate implements the booking backend's payment integration with the
//! Izipay gateway: hosted-checkout form tokens, signed asynchronous payment
//! notifications (browser callback and server-to-server IPN), idempotent
//! payment recording, and confirmation emails.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
