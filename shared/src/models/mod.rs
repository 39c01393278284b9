//! Data models
//!
//! Shared between directory-server and API clients.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).
//! Every record is scoped to a tenant; the tenant id never comes from the
//! payload itself, it is established by the caller.

pub mod custom_field;
pub mod employee;
pub mod query;
pub mod serde_helpers;

// Re-exports
pub use custom_field::*;
pub use employee::*;
pub use query::*;
