//! Tenant context extraction
//!
//! Every tenant-scoped route resolves the caller's tenant from the
//! `x-tenant-id` header. The extracted id is passed explicitly into every
//! repository call — there is no ambient tenant state, so concurrent
//! requests for different tenants cannot leak into each other.

use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::utils::AppError;

/// Header carrying the tenant identifier
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Maximum tenant identifier length
const MAX_TENANT_ID_LEN: usize = 64;

/// Request-scoped tenant identity
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: String,
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        let tenant_id = parse_tenant_id(raw)?;
        Ok(Self { tenant_id })
    }
}

fn parse_tenant_id(raw: &str) -> Result<String, AppError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!(
            "{TENANT_HEADER} header is required"
        )));
    }
    if value.len() > MAX_TENANT_ID_LEN
        || !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::validation(format!(
            "{TENANT_HEADER} must be a short alphanumeric identifier"
        )));
    }
    Ok(value.to_string())
}
