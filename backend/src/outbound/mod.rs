//! Outbound adapters implementing the driven ports.
//!
//! - **persistence**: PostgreSQL repositories using Diesel.
//! - **media**: image files under a capability-scoped media root.
//!
//! Adapters translate between domain types and infrastructure representations
//! and contain no business rules.

pub mod media;
pub mod persistence;
