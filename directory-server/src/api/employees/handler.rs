//! Employee API Handlers
//!
//! Handlers run the validation layer first, then call the repository with
//! the request's tenant id. Error kinds map to HTTP status codes in
//! [`crate::utils::error`].

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::api::tenant::TenantContext;
use crate::core::ServerState;
use crate::db::repository::employee;
use crate::utils::validation::{self, MAX_BULK_ITEMS};
use crate::utils::{AppError, AppResult};
use shared::models::{
    BulkUpdateItem, BulkUpdateSummary, Employee, EmployeeCreate, EmployeeFilters,
    EmployeeHierarchy, EmployeeImport, EmployeeImportRow, EmployeeStatistics, EmployeeUpdate,
    ImportOutcome, ImportSummary, PaginatedResponse, PaginationParams,
};

/// Query string for GET /api/employees
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    page: Option<u32>,
    page_size: Option<u32>,
    sort_by: Option<String>,
    sort_order: Option<String>,
    search: Option<String>,
    department: Option<String>,
    title: Option<String>,
    is_active: Option<bool>,
    /// Comma-separated list; every skill must match
    skills: Option<String>,
    manager_id: Option<i64>,
}

/// List employees (paged, filtered)
pub async fn list(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<PaginatedResponse<Employee>>> {
    let pagination = validation::validate_pagination(&PaginationParams {
        page: query.page,
        page_size: query.page_size,
        sort_by: query.sort_by,
        sort_order: query.sort_order,
    })?;
    let filters = validation::validate_employee_filters(EmployeeFilters {
        search: query.search,
        department: query.department,
        title: query.title,
        is_active: query.is_active,
        skills: query
            .skills
            .map(|s| s.split(',').map(str::to_string).collect()),
        manager_id: query.manager_id,
    })?;

    let page = employee::find_many(&state.pool, &tenant.tenant_id, &filters, &pagination).await?;
    Ok(Json(page))
}

/// Get employee by id (active or not — the caller decides what to show)
pub async fn get_by_id(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<Employee>> {
    let found = employee::find_by_id(&state.pool, &tenant.tenant_id, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee {id} not found")))?;
    Ok(Json(found))
}

/// Create a new employee
pub async fn create(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<Employee>> {
    let data = validation::validate_create_employee(payload)?;
    let created = employee::create(&state.pool, &tenant.tenant_id, data).await?;
    Ok(Json(created))
}

/// Update an employee
pub async fn update(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<Employee>> {
    let data = validation::validate_update_employee(payload)?;
    let updated = employee::update(&state.pool, &tenant.tenant_id, id, data).await?;
    Ok(Json(updated))
}

/// Soft delete an employee
pub async fn delete(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = employee::soft_delete(&state.pool, &tenant.tenant_id, id).await?;
    Ok(Json(result))
}

/// Get an employee's management chain and direct reports
pub async fn hierarchy(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<EmployeeHierarchy>> {
    let hierarchy = employee::get_hierarchy(&state.pool, &tenant.tenant_id, id).await?;
    Ok(Json(hierarchy))
}

/// Aggregate counts for the tenant
pub async fn statistics(
    State(state): State<ServerState>,
    tenant: TenantContext,
) -> AppResult<Json<EmployeeStatistics>> {
    let stats = employee::get_statistics(&state.pool, &tenant.tenant_id).await?;
    Ok(Json(stats))
}

/// Apply a batch of updates; per-item outcomes, no cross-item rollback
pub async fn bulk_update(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Json(items): Json<Vec<BulkUpdateItem>>,
) -> AppResult<Json<BulkUpdateSummary>> {
    let items = validation::validate_bulk_employees(items)?;
    let summary = employee::bulk_update(&state.pool, &tenant.tenant_id, items).await?;
    Ok(Json(summary))
}

/// Import loosely-typed rows. Rows that fail validation are reported in
/// the summary alongside repository failures — a bad row never aborts
/// the batch.
pub async fn import(
    State(state): State<ServerState>,
    tenant: TenantContext,
    Json(rows): Json<Vec<EmployeeImportRow>>,
) -> AppResult<Json<ImportSummary>> {
    if rows.is_empty() {
        return Err(AppError::validation("rows: at least one row required"));
    }
    if rows.len() > MAX_BULK_ITEMS {
        return Err(AppError::validation(format!(
            "rows: at most {MAX_BULK_ITEMS} rows per import, got {}",
            rows.len()
        )));
    }

    let mut outcomes: Vec<Option<ImportOutcome>> = Vec::new();
    outcomes.resize_with(rows.len(), || None);
    let mut valid: Vec<(usize, EmployeeImport)> = Vec::new();

    for (i, row) in rows.into_iter().enumerate() {
        let email = row.email.trim().to_string();
        match validation::validate_import_employee(row) {
            Ok(import) => valid.push((i, import)),
            Err(e) => {
                outcomes[i] = Some(ImportOutcome {
                    email,
                    success: false,
                    id: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    let indices: Vec<usize> = valid.iter().map(|(i, _)| *i).collect();
    let imports: Vec<EmployeeImport> = valid.into_iter().map(|(_, import)| import).collect();
    let repo_summary = employee::import(&state.pool, &tenant.tenant_id, imports).await?;
    for (i, outcome) in indices.into_iter().zip(repo_summary.outcomes) {
        outcomes[i] = Some(outcome);
    }

    let outcomes: Vec<ImportOutcome> = outcomes.into_iter().flatten().collect();
    let successful = outcomes.iter().filter(|o| o.success).count() as u32;
    let failed = outcomes.len() as u32 - successful;
    Ok(Json(ImportSummary {
        successful,
        failed,
        outcomes,
    }))
}
