//! Repository Module
//!
//! Tenant-scoped CRUD over SQLite. Every function takes the tenant id as
//! its first data argument and applies it as a filter on every read and
//! write — cross-tenant access is not possible through this layer.

pub mod custom_field;
pub mod employee;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate email: {0}")]
    DuplicateEmail(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Circular relationship: {0}")]
    CircularRelationship(String),

    /// Manager chain longer than the bounded walk allows — corrupt data,
    /// reported rather than silently truncated
    #[error("Hierarchy depth exceeded: {0}")]
    HierarchyDepth(String),

    #[error("Custom field validation failed: {}", .0.join("; "))]
    SchemaValidation(Vec<String>),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl RepoError {
    /// True when a sqlx error is a unique-constraint violation.
    ///
    /// The unique indexes (email per tenant, field name per tenant) are
    /// the authoritative guard against concurrent duplicate writes; the
    /// repository pre-checks only exist for better error messages.
    pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
