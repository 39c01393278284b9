//! Custom Field Repository
//!
//! Tenant-defined field schemas. Employee values reference these
//! definitions by field name; see [`crate::fields`] for value validation.

use super::{RepoError, RepoResult};
use crate::utils::validation::{MAX_TEXT_LEN, is_valid_field_name};
use shared::models::{CustomField, CustomFieldCreate, CustomFieldUpdate, FieldType};
use sqlx::SqlitePool;

const CUSTOM_FIELD_SELECT: &str = "SELECT id, tenant_id, field_name, field_type, is_required, options, display_order, created_at, updated_at FROM custom_field";

/// Raw row — `options` comes back as JSON TEXT, `field_type` as its wire name
#[derive(sqlx::FromRow)]
struct CustomFieldRow {
    id: i64,
    tenant_id: String,
    field_name: String,
    field_type: String,
    is_required: bool,
    options: String,
    display_order: i64,
    created_at: i64,
    updated_at: i64,
}

impl CustomFieldRow {
    fn into_custom_field(self) -> RepoResult<CustomField> {
        let field_type = FieldType::parse(&self.field_type).ok_or_else(|| {
            RepoError::Database(format!(
                "Corrupt field_type '{}' for custom field {}",
                self.field_type, self.id
            ))
        })?;
        let options = serde_json::from_str(&self.options).map_err(|e| {
            RepoError::Database(format!("Corrupt options JSON for custom field {}: {e}", self.id))
        })?;
        Ok(CustomField {
            id: self.id,
            tenant_id: self.tenant_id,
            field_name: self.field_name,
            field_type,
            is_required: self.is_required,
            options,
            display_order: self.display_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Find all field definitions of a tenant, in display order
pub async fn find_all(pool: &SqlitePool, tenant_id: &str) -> RepoResult<Vec<CustomField>> {
    let sql = format!(
        "{CUSTOM_FIELD_SELECT} WHERE tenant_id = ? ORDER BY display_order, field_name"
    );
    let rows = sqlx::query_as::<_, CustomFieldRow>(&sql)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
    rows.into_iter().map(CustomFieldRow::into_custom_field).collect()
}

pub async fn find_by_id(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
) -> RepoResult<Option<CustomField>> {
    let sql = format!("{CUSTOM_FIELD_SELECT} WHERE tenant_id = ? AND id = ?");
    let row = sqlx::query_as::<_, CustomFieldRow>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(CustomFieldRow::into_custom_field).transpose()
}

pub async fn find_by_name(
    pool: &SqlitePool,
    tenant_id: &str,
    field_name: &str,
) -> RepoResult<Option<CustomField>> {
    let sql = format!("{CUSTOM_FIELD_SELECT} WHERE tenant_id = ? AND field_name = ?");
    let row = sqlx::query_as::<_, CustomFieldRow>(&sql)
        .bind(tenant_id)
        .bind(field_name)
        .fetch_optional(pool)
        .await?;
    row.map(CustomFieldRow::into_custom_field).transpose()
}

/// Create a field definition.
///
/// Field names must follow the identifier pattern and be unique per
/// tenant; dropdown/multiselect fields must declare at least one option.
pub async fn create(
    pool: &SqlitePool,
    tenant_id: &str,
    data: CustomFieldCreate,
) -> RepoResult<CustomField> {
    let field_name = data.field_name.trim().to_string();
    if !is_valid_field_name(&field_name) {
        return Err(RepoError::Validation(format!(
            "fieldName '{field_name}' must match [A-Za-z_][A-Za-z0-9_]*"
        )));
    }
    validate_options(data.field_type, &data.options)?;

    if find_by_name(pool, tenant_id, &field_name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Custom field '{field_name}' already exists"
        )));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let options_json = serde_json::to_string(&data.options)
        .map_err(|e| RepoError::Database(format!("Failed to encode options: {e}")))?;

    sqlx::query(
        "INSERT INTO custom_field (id, tenant_id, field_name, field_type, is_required, options, display_order, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(&field_name)
    .bind(data.field_type.as_str())
    .bind(data.is_required)
    .bind(&options_json)
    .bind(data.display_order)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| {
        if RepoError::is_unique_violation(&e) {
            RepoError::Duplicate(format!("Custom field '{field_name}' already exists"))
        } else {
            e.into()
        }
    })?;

    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create custom field".into()))
}

/// Update a field definition (name and type are immutable)
pub async fn update(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    data: CustomFieldUpdate,
) -> RepoResult<CustomField> {
    let existing = find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Custom field {id} not found")))?;

    if let Some(ref options) = data.options {
        validate_options(existing.field_type, options)?;
    }

    let options_json = data
        .options
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| RepoError::Database(format!("Failed to encode options: {e}")))?;

    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE custom_field SET
            is_required = COALESCE(?1, is_required),
            options = COALESCE(?2, options),
            display_order = COALESCE(?3, display_order),
            updated_at = ?4
         WHERE tenant_id = ?5 AND id = ?6",
    )
    .bind(data.is_required)
    .bind(options_json)
    .bind(data.display_order)
    .bind(now)
    .bind(tenant_id)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Custom field {id} not found")))
}

/// Delete a field definition. Existing employee values keyed by this
/// field become unknown and will be rejected on their next write.
pub async fn delete(pool: &SqlitePool, tenant_id: &str, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM custom_field WHERE tenant_id = ? AND id = ?")
        .bind(tenant_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

fn validate_options(field_type: FieldType, options: &[String]) -> RepoResult<()> {
    if field_type.requires_options() {
        if options.is_empty() {
            return Err(RepoError::Validation(format!(
                "{} fields must declare at least one option",
                field_type.as_str()
            )));
        }
        for option in options {
            if option.trim().is_empty() {
                return Err(RepoError::Validation("options must not be empty".into()));
            }
            if option.len() > MAX_TEXT_LEN {
                return Err(RepoError::Validation(format!(
                    "option '{option}' too long (max {MAX_TEXT_LEN})"
                )));
            }
        }
    } else if !options.is_empty() {
        return Err(RepoError::Validation(format!(
            "{} fields do not take options",
            field_type.as_str()
        )));
    }
    Ok(())
}
