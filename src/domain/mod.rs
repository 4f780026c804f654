//! Domain layer - business logic with no framework or I/O dependencies
//! beyond the port traits it is handed.

pub mod foundation;
pub mod payment;
