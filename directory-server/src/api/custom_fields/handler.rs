//! Custom Field API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::tenant::TenantContext;
use crate::core::ServerState;
use crate::db::repository::custom_field;
use crate::utils::AppResult;
use shared::models::{CustomField, CustomFieldCreate, CustomFieldUpdate};

/// List the tenant's field definitions in display order
pub async fn list(
    State(state): State<ServerState>,
    tenant: TenantContext,
) -> AppResult<Json<Vec<CustomField>>> {
    let fields = custom_field::find_all(&state.pool, &tenant.tenant_id).await?;
    Ok(Json(fields))
}

/// Create a field definition
pub async fn create(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Json(payload): Json<CustomFieldCreate>,
) -> AppResult<Json<CustomField>> {
    let created = custom_field::create(&state.pool, &tenant.tenant_id, payload).await?;
    Ok(Json(created))
}

/// Update a field definition (name and type are immutable)
pub async fn update(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
    Json(payload): Json<CustomFieldUpdate>,
) -> AppResult<Json<CustomField>> {
    let updated = custom_field::update(&state.pool, &tenant.tenant_id, id, payload).await?;
    Ok(Json(updated))
}

/// Delete a field definition
pub async fn delete(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = custom_field::delete(&state.pool, &tenant.tenant_id, id).await?;
    Ok(Json(result))
}
