//! Shared types for the employee directory service
//!
//! Domain models and small utilities used by directory-server and any
//! API clients. Wire format is camelCase JSON; storage concerns stay in
//! the server crate.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
