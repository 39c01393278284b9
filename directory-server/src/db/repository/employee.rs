//! Employee Repository
//!
//! Tenant-scoped persistence plus hierarchy traversal. The manager graph
//! must stay a forest: every write that changes `manager_id` walks the
//! proposed manager's ancestor chain first and rejects cycles.

use super::{RepoError, RepoResult, custom_field};
use shared::models::{
    BulkItemOutcome, BulkUpdateItem, BulkUpdateSummary, Employee, EmployeeCreate,
    EmployeeFilters, EmployeeHierarchy, EmployeeImport, EmployeeStatistics, EmployeeUpdate,
    GroupCount, ImportOutcome, ImportSummary, PaginatedResponse, Pagination, SortField,
    SortOrder,
};
use sqlx::SqlitePool;

const EMPLOYEE_SELECT: &str = "SELECT id, tenant_id, first_name, last_name, email, phone, extension, title, department, office_location, manager_id, bio, skills, custom_fields, is_active, created_at, updated_at FROM employee";

/// Upper bound on the manager-chain walk. The forest invariant keeps real
/// chains short; anything longer means corrupt data and is reported as
/// [`RepoError::HierarchyDepth`] instead of looping forever.
const MAX_CHAIN_DEPTH: usize = 100;

/// Raw employee row — JSON columns come back as TEXT
#[derive(sqlx::FromRow)]
struct EmployeeRow {
    id: i64,
    tenant_id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    extension: Option<String>,
    title: Option<String>,
    department: Option<String>,
    office_location: Option<String>,
    manager_id: Option<i64>,
    bio: Option<String>,
    skills: String,
    custom_fields: String,
    is_active: bool,
    created_at: i64,
    updated_at: i64,
}

impl EmployeeRow {
    fn into_employee(self) -> RepoResult<Employee> {
        let skills = serde_json::from_str(&self.skills).map_err(|e| {
            RepoError::Database(format!("Corrupt skills JSON for employee {}: {e}", self.id))
        })?;
        let custom_fields = serde_json::from_str(&self.custom_fields).map_err(|e| {
            RepoError::Database(format!(
                "Corrupt custom_fields JSON for employee {}: {e}",
                self.id
            ))
        })?;
        Ok(Employee {
            id: self.id,
            tenant_id: self.tenant_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            extension: self.extension,
            title: self.title,
            department: self.department,
            office_location: self.office_location,
            manager_id: self.manager_id,
            bio: self.bio,
            skills,
            custom_fields,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Find an employee by id. Inactive rows are returned too — filtering is
/// the caller's decision.
pub async fn find_by_id(pool: &SqlitePool, tenant_id: &str, id: i64) -> RepoResult<Option<Employee>> {
    let sql = format!("{EMPLOYEE_SELECT} WHERE tenant_id = ? AND id = ?");
    let row = sqlx::query_as::<_, EmployeeRow>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(EmployeeRow::into_employee).transpose()
}

/// Find an employee by email (case-insensitive), active or not
pub async fn find_by_email(
    pool: &SqlitePool,
    tenant_id: &str,
    email: &str,
) -> RepoResult<Option<Employee>> {
    let sql = format!("{EMPLOYEE_SELECT} WHERE tenant_id = ? AND email = ? COLLATE NOCASE");
    let row = sqlx::query_as::<_, EmployeeRow>(&sql)
        .bind(tenant_id)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    row.map(EmployeeRow::into_employee).transpose()
}

/// Create a new employee.
///
/// Email uniqueness is pre-checked for a friendly error, but the unique
/// index on (tenant_id, email) is the authoritative guard under
/// concurrent creates. Non-empty custom fields are validated against the
/// tenant's field definitions.
pub async fn create(
    pool: &SqlitePool,
    tenant_id: &str,
    data: EmployeeCreate,
) -> RepoResult<Employee> {
    if find_by_email(pool, tenant_id, &data.email).await?.is_some() {
        return Err(RepoError::DuplicateEmail(data.email));
    }

    if !data.custom_fields.is_empty() {
        let defs = custom_field::find_all(pool, tenant_id).await?;
        crate::fields::validate_custom_field_values(&defs, &data.custom_fields)
            .map_err(RepoError::SchemaValidation)?;
    }

    if let Some(manager_id) = data.manager_id
        && find_by_id(pool, tenant_id, manager_id).await?.is_none()
    {
        return Err(RepoError::NotFound(format!("Manager {manager_id} not found")));
    }

    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    let skills_json = serde_json::to_string(&data.skills)
        .map_err(|e| RepoError::Database(format!("Failed to encode skills: {e}")))?;
    let custom_fields_json = serde_json::to_string(&data.custom_fields)
        .map_err(|e| RepoError::Database(format!("Failed to encode custom fields: {e}")))?;

    sqlx::query(
        "INSERT INTO employee (id, tenant_id, first_name, last_name, email, phone, extension, title, department, office_location, manager_id, bio, skills, custom_fields, is_active, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 1, ?15, ?15)",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.extension)
    .bind(&data.title)
    .bind(&data.department)
    .bind(&data.office_location)
    .bind(data.manager_id)
    .bind(&data.bio)
    .bind(&skills_json)
    .bind(&custom_fields_json)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| {
        if RepoError::is_unique_violation(&e) {
            RepoError::DuplicateEmail(data.email.clone())
        } else {
            e.into()
        }
    })?;

    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create employee".into()))
}

/// Update an employee.
///
/// A `manager_id` change triggers the ancestor walk; an email change
/// re-checks uniqueness; a custom-fields change re-validates against the
/// tenant's definitions. Absent fields stay untouched.
pub async fn update(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
    data: EmployeeUpdate,
) -> RepoResult<Employee> {
    let existing = find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))?;

    // Check duplicate email if changing
    if let Some(ref new_email) = data.email
        && !new_email.eq_ignore_ascii_case(&existing.email)
        && find_by_email(pool, tenant_id, new_email).await?.is_some()
    {
        return Err(RepoError::DuplicateEmail(new_email.clone()));
    }

    // Manager change: the one true algorithmic invariant — the manager
    // graph stays a forest
    if let Some(Some(new_manager_id)) = data.manager_id {
        if new_manager_id == id {
            return Err(RepoError::CircularRelationship(format!(
                "Employee {id} cannot be their own manager"
            )));
        }
        if find_by_id(pool, tenant_id, new_manager_id).await?.is_none() {
            return Err(RepoError::NotFound(format!(
                "Manager {new_manager_id} not found"
            )));
        }
        ensure_no_cycle(pool, tenant_id, id, new_manager_id).await?;
    }

    if let Some(ref custom_fields) = data.custom_fields
        && !custom_fields.is_empty()
    {
        let defs = custom_field::find_all(pool, tenant_id).await?;
        crate::fields::validate_custom_field_values(defs.as_slice(), custom_fields)
            .map_err(RepoError::SchemaValidation)?;
    }

    let skills_json = data
        .skills
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| RepoError::Database(format!("Failed to encode skills: {e}")))?;
    let custom_fields_json = data
        .custom_fields
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| RepoError::Database(format!("Failed to encode custom fields: {e}")))?;

    let has_manager_change = data.manager_id.is_some();
    let new_manager_id = data.manager_id.flatten();
    let now = shared::util::now_millis();

    let rows = sqlx::query(
        "UPDATE employee SET
            first_name = COALESCE(?1, first_name),
            last_name = COALESCE(?2, last_name),
            email = COALESCE(?3, email),
            phone = COALESCE(?4, phone),
            extension = COALESCE(?5, extension),
            title = COALESCE(?6, title),
            department = COALESCE(?7, department),
            office_location = COALESCE(?8, office_location),
            manager_id = CASE WHEN ?9 THEN ?10 ELSE manager_id END,
            bio = COALESCE(?11, bio),
            skills = COALESCE(?12, skills),
            custom_fields = COALESCE(?13, custom_fields),
            is_active = COALESCE(?14, is_active),
            updated_at = ?15
         WHERE tenant_id = ?16 AND id = ?17",
    )
    .bind(&data.first_name)
    .bind(&data.last_name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.extension)
    .bind(&data.title)
    .bind(&data.department)
    .bind(&data.office_location)
    .bind(has_manager_change)
    .bind(new_manager_id)
    .bind(&data.bio)
    .bind(&skills_json)
    .bind(&custom_fields_json)
    .bind(data.is_active)
    .bind(now)
    .bind(tenant_id)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| {
        if RepoError::is_unique_violation(&e) {
            RepoError::DuplicateEmail(data.email.clone().unwrap_or_default())
        } else {
            e.into()
        }
    })?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Employee {id} not found")));
    }

    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))
}

/// Soft-delete an employee: sets `is_active = 0`, keeps the row.
/// Direct reports are NOT cascade-deactivated — that is caller policy.
pub async fn soft_delete(pool: &SqlitePool, tenant_id: &str, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE employee SET is_active = 0, updated_at = ? WHERE tenant_id = ? AND id = ? AND is_active = 1",
    )
    .bind(now)
    .bind(tenant_id)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Load an employee with its management chain and direct reports.
///
/// The chain is ordered immediate manager first, root last; reports are
/// immediate children only.
pub async fn get_hierarchy(
    pool: &SqlitePool,
    tenant_id: &str,
    id: i64,
) -> RepoResult<EmployeeHierarchy> {
    let employee = find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))?;

    let mut management_chain = Vec::new();
    let mut current = employee.manager_id;
    while let Some(manager_id) = current {
        if management_chain.len() >= MAX_CHAIN_DEPTH {
            return Err(RepoError::HierarchyDepth(format!(
                "Management chain of employee {id} exceeds {MAX_CHAIN_DEPTH} levels"
            )));
        }
        let manager = find_by_id(pool, tenant_id, manager_id).await?.ok_or_else(|| {
            RepoError::Database(format!(
                "Dangling manager reference {manager_id} on employee chain of {id}"
            ))
        })?;
        current = manager.manager_id;
        management_chain.push(manager);
    }

    let sql = format!(
        "{EMPLOYEE_SELECT} WHERE tenant_id = ? AND manager_id = ? ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE"
    );
    let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_all(pool)
        .await?;
    let direct_reports = rows
        .into_iter()
        .map(EmployeeRow::into_employee)
        .collect::<RepoResult<Vec<_>>>()?;

    Ok(EmployeeHierarchy {
        employee,
        management_chain,
        direct_reports,
    })
}

/// Walk the proposed manager's ancestor chain; reject when the employee
/// being updated shows up in it. Bounded — an over-long chain is a
/// data-integrity error, not an infinite loop.
async fn ensure_no_cycle(
    pool: &SqlitePool,
    tenant_id: &str,
    employee_id: i64,
    new_manager_id: i64,
) -> RepoResult<()> {
    let mut current = Some(new_manager_id);
    let mut depth = 0usize;

    while let Some(ancestor) = current {
        if ancestor == employee_id {
            return Err(RepoError::CircularRelationship(format!(
                "Employee {employee_id} is already an ancestor of manager {new_manager_id}"
            )));
        }
        depth += 1;
        if depth > MAX_CHAIN_DEPTH {
            return Err(RepoError::HierarchyDepth(format!(
                "Manager chain starting at {new_manager_id} exceeds {MAX_CHAIN_DEPTH} levels"
            )));
        }
        current = manager_id_of(pool, tenant_id, ancestor).await?;
    }

    Ok(())
}

async fn manager_id_of(pool: &SqlitePool, tenant_id: &str, id: i64) -> RepoResult<Option<i64>> {
    let row: Option<(Option<i64>,)> =
        sqlx::query_as("SELECT manager_id FROM employee WHERE tenant_id = ? AND id = ?")
            .bind(tenant_id)
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|r| r.0))
}

// ── List queries ────────────────────────────────────────────────────

/// Owned bind value for dynamically assembled filter clauses
enum Bind {
    Text(String),
    Int(i64),
    Bool(bool),
}

fn push_filters(where_sql: &mut String, binds: &mut Vec<Bind>, filters: &EmployeeFilters) {
    if let Some(ref department) = filters.department {
        where_sql.push_str(" AND department = ? COLLATE NOCASE");
        binds.push(Bind::Text(department.clone()));
    }
    if let Some(ref title) = filters.title {
        where_sql.push_str(" AND title = ? COLLATE NOCASE");
        binds.push(Bind::Text(title.clone()));
    }
    if let Some(is_active) = filters.is_active {
        where_sql.push_str(" AND is_active = ?");
        binds.push(Bind::Bool(is_active));
    }
    if let Some(manager_id) = filters.manager_id {
        where_sql.push_str(" AND manager_id = ?");
        binds.push(Bind::Int(manager_id));
    }
    if let Some(ref search) = filters.search {
        where_sql.push_str(
            " AND (first_name LIKE ? OR last_name LIKE ? OR email LIKE ? OR title LIKE ? OR department LIKE ?)",
        );
        let pattern = format!("%{search}%");
        for _ in 0..5 {
            binds.push(Bind::Text(pattern.clone()));
        }
    }
    if let Some(ref skills) = filters.skills {
        // every requested skill must be present (JSON1 over the skills array)
        for skill in skills {
            where_sql.push_str(
                " AND EXISTS (SELECT 1 FROM json_each(employee.skills) WHERE json_each.value = ? COLLATE NOCASE)",
            );
            binds.push(Bind::Text(skill.clone()));
        }
    }
}

fn sort_sql(field: SortField) -> &'static str {
    match field {
        SortField::FirstName => "first_name COLLATE NOCASE",
        SortField::LastName => "last_name COLLATE NOCASE",
        SortField::Email => "email COLLATE NOCASE",
        SortField::Title => "title COLLATE NOCASE",
        SortField::Department => "department COLLATE NOCASE",
        SortField::CreatedAt => "created_at",
        SortField::UpdatedAt => "updated_at",
    }
}

/// Page through a tenant's employees with filters applied.
/// `total`/`totalPages` reflect the filter-matched count.
pub async fn find_many(
    pool: &SqlitePool,
    tenant_id: &str,
    filters: &EmployeeFilters,
    pagination: &Pagination,
) -> RepoResult<PaginatedResponse<Employee>> {
    let mut where_sql = String::from(" WHERE tenant_id = ?");
    let mut binds = vec![Bind::Text(tenant_id.to_string())];
    push_filters(&mut where_sql, &mut binds, filters);

    let count_sql = format!("SELECT COUNT(*) FROM employee{where_sql}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for bind in &binds {
        count_query = match bind {
            Bind::Text(s) => count_query.bind(s.as_str()),
            Bind::Int(i) => count_query.bind(*i),
            Bind::Bool(b) => count_query.bind(*b),
        };
    }
    let total = count_query.fetch_one(pool).await?;

    let direction = match pagination.sort_order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    let offset = (i64::from(pagination.page) - 1) * i64::from(pagination.page_size);
    let sql = format!(
        "{EMPLOYEE_SELECT}{where_sql} ORDER BY {} {direction}, id ASC LIMIT ? OFFSET ?",
        sort_sql(pagination.sort_by)
    );
    let mut query = sqlx::query_as::<_, EmployeeRow>(&sql);
    for bind in &binds {
        query = match bind {
            Bind::Text(s) => query.bind(s.as_str()),
            Bind::Int(i) => query.bind(*i),
            Bind::Bool(b) => query.bind(*b),
        };
    }
    let rows = query
        .bind(i64::from(pagination.page_size))
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let data = rows
        .into_iter()
        .map(EmployeeRow::into_employee)
        .collect::<RepoResult<Vec<_>>>()?;

    Ok(PaginatedResponse::new(
        data,
        total as u64,
        pagination.page,
        pagination.page_size,
    ))
}

/// Aggregate counts for a tenant: totals plus department and title
/// distributions over active employees
pub async fn get_statistics(pool: &SqlitePool, tenant_id: &str) -> RepoResult<EmployeeStatistics> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employee WHERE tenant_id = ?")
        .bind(tenant_id)
        .fetch_one(pool)
        .await?;
    let active: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM employee WHERE tenant_id = ? AND is_active = 1")
            .bind(tenant_id)
            .fetch_one(pool)
            .await?;

    let by_department = distribution(pool, tenant_id, "department").await?;
    let by_title = distribution(pool, tenant_id, "title").await?;

    Ok(EmployeeStatistics {
        total,
        active,
        by_department,
        by_title,
    })
}

async fn distribution(
    pool: &SqlitePool,
    tenant_id: &str,
    column: &str,
) -> RepoResult<Vec<GroupCount>> {
    // column is a fixed identifier chosen by this module, never user input
    let sql = format!(
        "SELECT {column}, COUNT(*) FROM employee
         WHERE tenant_id = ? AND is_active = 1 AND {column} IS NOT NULL
         GROUP BY {column} ORDER BY COUNT(*) DESC, {column}"
    );
    let rows: Vec<(String, i64)> = sqlx::query_as(&sql).bind(tenant_id).fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .map(|(name, count)| GroupCount { name, count })
        .collect())
}

// ── Batch operations ────────────────────────────────────────────────

/// Apply each update independently; one item's failure never aborts the
/// rest. Outcomes are reported per item, in input order.
pub async fn bulk_update(
    pool: &SqlitePool,
    tenant_id: &str,
    updates: Vec<BulkUpdateItem>,
) -> RepoResult<BulkUpdateSummary> {
    let mut outcomes = Vec::with_capacity(updates.len());
    let mut successful = 0u32;
    let mut failed = 0u32;

    for item in updates {
        match update(pool, tenant_id, item.id, item.data).await {
            Ok(_) => {
                successful += 1;
                outcomes.push(BulkItemOutcome {
                    id: item.id,
                    success: true,
                    error: None,
                });
            }
            Err(e) => {
                failed += 1;
                outcomes.push(BulkItemOutcome {
                    id: item.id,
                    success: false,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    Ok(BulkUpdateSummary {
        successful,
        failed,
        outcomes,
    })
}

/// Import normalized rows, resolving each optional `manager_email` to an
/// id within the tenant. Rows are applied independently.
pub async fn import(
    pool: &SqlitePool,
    tenant_id: &str,
    rows: Vec<EmployeeImport>,
) -> RepoResult<ImportSummary> {
    let mut outcomes = Vec::with_capacity(rows.len());
    let mut successful = 0u32;
    let mut failed = 0u32;

    for row in rows {
        let email = row.data.email.clone();
        match import_one(pool, tenant_id, row).await {
            Ok(created) => {
                successful += 1;
                outcomes.push(ImportOutcome {
                    email,
                    success: true,
                    id: Some(created.id),
                    error: None,
                });
            }
            Err(e) => {
                failed += 1;
                outcomes.push(ImportOutcome {
                    email,
                    success: false,
                    id: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    Ok(ImportSummary {
        successful,
        failed,
        outcomes,
    })
}

async fn import_one(
    pool: &SqlitePool,
    tenant_id: &str,
    row: EmployeeImport,
) -> RepoResult<Employee> {
    let mut data = row.data;
    if let Some(ref manager_email) = row.manager_email {
        let manager = find_by_email(pool, tenant_id, manager_email)
            .await?
            .ok_or_else(|| {
                RepoError::NotFound(format!("Manager with email {manager_email} not found"))
            })?;
        data.manager_id = Some(manager.id);
    }
    create(pool, tenant_id, data).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{CustomFieldCreate, FieldType};
    use sqlx::sqlite::SqlitePoolOptions;

    /// In-memory SQLite pool with the employee + custom_field schema
    /// (mirrors migrations/0001_init.sql)
    async fn test_pool() -> SqlitePool {
        // single connection: ":memory:" databases are per-connection
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE employee (
                id INTEGER PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT,
                extension TEXT,
                title TEXT,
                department TEXT,
                office_location TEXT,
                manager_id INTEGER REFERENCES employee(id),
                bio TEXT,
                skills TEXT NOT NULL DEFAULT '[]',
                custom_fields TEXT NOT NULL DEFAULT '{}',
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "CREATE UNIQUE INDEX idx_employee_tenant_email
             ON employee (tenant_id, email COLLATE NOCASE)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "CREATE TABLE custom_field (
                id INTEGER PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                field_name TEXT NOT NULL,
                field_type TEXT NOT NULL,
                is_required INTEGER NOT NULL DEFAULT 0,
                options TEXT NOT NULL DEFAULT '[]',
                display_order INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    fn sample(first: &str, last: &str, email: &str) -> EmployeeCreate {
        EmployeeCreate {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    fn set_manager(manager_id: Option<i64>) -> EmployeeUpdate {
        EmployeeUpdate {
            manager_id: Some(manager_id),
            ..Default::default()
        }
    }

    fn default_pagination() -> Pagination {
        Pagination {
            page: 1,
            page_size: 20,
            sort_by: SortField::LastName,
            sort_order: SortOrder::Asc,
        }
    }

    // ── create / find ───────────────────────────────────────────────

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = test_pool().await;
        let created = create(&pool, "acme", sample("John", "Doe", "john@x.com"))
            .await
            .unwrap();
        assert!(created.is_active);

        let by_id = find_by_id(&pool, "acme", created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "john@x.com");

        let by_email = find_by_email(&pool, "acme", "JOHN@X.COM").await.unwrap();
        assert!(by_email.is_some(), "email lookup is case-insensitive");
    }

    #[tokio::test]
    async fn test_create_duplicate_email_rejected() {
        let pool = test_pool().await;
        create(&pool, "acme", sample("John", "Doe", "john@x.com"))
            .await
            .unwrap();
        let err = create(&pool, "acme", sample("Johnny", "Doe", "John@X.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_same_email_other_tenant_ok() {
        let pool = test_pool().await;
        create(&pool, "acme", sample("John", "Doe", "john@x.com"))
            .await
            .unwrap();
        assert!(
            create(&pool, "globex", sample("John", "Doe", "john@x.com"))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_tenant_isolation_on_find() {
        let pool = test_pool().await;
        let created = create(&pool, "acme", sample("John", "Doe", "john@x.com"))
            .await
            .unwrap();
        assert!(
            find_by_id(&pool, "globex", created.id)
                .await
                .unwrap()
                .is_none(),
            "another tenant must not see the row"
        );
    }

    #[tokio::test]
    async fn test_create_unknown_custom_field_rejected() {
        let pool = test_pool().await;
        let mut data = sample("John", "Doe", "john@x.com");
        data.custom_fields
            .insert("shoe_size".to_string(), serde_json::json!(43));
        let err = create(&pool, "acme", data).await.unwrap_err();
        assert!(matches!(err, RepoError::SchemaValidation(_)));
    }

    #[tokio::test]
    async fn test_create_with_valid_custom_field() {
        let pool = test_pool().await;
        custom_field::create(
            &pool,
            "acme",
            CustomFieldCreate {
                field_name: "work_mode".to_string(),
                field_type: FieldType::Dropdown,
                is_required: false,
                options: vec!["Remote".to_string(), "Office".to_string()],
                display_order: 0,
            },
        )
        .await
        .unwrap();

        let mut data = sample("John", "Doe", "john@x.com");
        data.custom_fields
            .insert("work_mode".to_string(), serde_json::json!("Remote"));
        let created = create(&pool, "acme", data).await.unwrap();
        assert_eq!(created.custom_fields["work_mode"], "Remote");

        let mut bad = sample("Jane", "Smith", "jane@x.com");
        bad.custom_fields
            .insert("work_mode".to_string(), serde_json::json!("Hybrid"));
        assert!(matches!(
            create(&pool, "acme", bad).await.unwrap_err(),
            RepoError::SchemaValidation(_)
        ));
    }

    #[tokio::test]
    async fn test_create_missing_manager_rejected() {
        let pool = test_pool().await;
        let mut data = sample("John", "Doe", "john@x.com");
        data.manager_id = Some(424242);
        assert!(matches!(
            create(&pool, "acme", data).await.unwrap_err(),
            RepoError::NotFound(_)
        ));
    }

    // ── update / hierarchy ──────────────────────────────────────────

    #[tokio::test]
    async fn test_manager_cycle_rejected() {
        let pool = test_pool().await;
        let john = create(&pool, "acme", sample("John", "Doe", "john@x.com"))
            .await
            .unwrap();
        let jane = create(&pool, "acme", sample("Jane", "Smith", "jane@x.com"))
            .await
            .unwrap();

        // John reports to Jane — fine
        update(&pool, "acme", john.id, set_manager(Some(jane.id)))
            .await
            .unwrap();

        // Jane reporting to John would close the loop
        let err = update(&pool, "acme", jane.id, set_manager(Some(john.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::CircularRelationship(_)));
    }

    #[tokio::test]
    async fn test_transitive_cycle_rejected() {
        let pool = test_pool().await;
        let a = create(&pool, "acme", sample("Aa", "Aa", "a@x.com")).await.unwrap();
        let b = create(&pool, "acme", sample("Bb", "Bb", "b@x.com")).await.unwrap();
        let c = create(&pool, "acme", sample("Cc", "Cc", "c@x.com")).await.unwrap();

        update(&pool, "acme", b.id, set_manager(Some(a.id))).await.unwrap();
        update(&pool, "acme", c.id, set_manager(Some(b.id))).await.unwrap();

        // a → c would make a its own ancestor (a ← b ← c ← a)
        let err = update(&pool, "acme", a.id, set_manager(Some(c.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::CircularRelationship(_)));
    }

    #[tokio::test]
    async fn test_self_manager_rejected() {
        let pool = test_pool().await;
        let john = create(&pool, "acme", sample("John", "Doe", "john@x.com"))
            .await
            .unwrap();
        let err = update(&pool, "acme", john.id, set_manager(Some(john.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::CircularRelationship(_)));
    }

    #[tokio::test]
    async fn test_clear_manager() {
        let pool = test_pool().await;
        let jane = create(&pool, "acme", sample("Jane", "Smith", "jane@x.com"))
            .await
            .unwrap();
        let mut data = sample("John", "Doe", "john@x.com");
        data.manager_id = Some(jane.id);
        let john = create(&pool, "acme", data).await.unwrap();

        let updated = update(&pool, "acme", john.id, set_manager(None)).await.unwrap();
        assert_eq!(updated.manager_id, None);
    }

    #[tokio::test]
    async fn test_corrupt_chain_hits_depth_guard() {
        let pool = test_pool().await;
        let a = create(&pool, "acme", sample("Aa", "Aa", "a@x.com")).await.unwrap();
        let b = create(&pool, "acme", sample("Bb", "Bb", "b@x.com")).await.unwrap();
        let c = create(&pool, "acme", sample("Cc", "Cc", "c@x.com")).await.unwrap();

        // Forge a pre-existing a↔b cycle behind the repository's back
        sqlx::query("UPDATE employee SET manager_id = ? WHERE id = ?")
            .bind(b.id)
            .bind(a.id)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("UPDATE employee SET manager_id = ? WHERE id = ?")
            .bind(a.id)
            .bind(b.id)
            .execute(&pool)
            .await
            .unwrap();

        // Walking a's chain never reaches c — the guard must trip, not hang
        let err = update(&pool, "acme", c.id, set_manager(Some(a.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::HierarchyDepth(_)));
    }

    #[tokio::test]
    async fn test_update_duplicate_email_rejected() {
        let pool = test_pool().await;
        create(&pool, "acme", sample("John", "Doe", "john@x.com"))
            .await
            .unwrap();
        let jane = create(&pool, "acme", sample("Jane", "Smith", "jane@x.com"))
            .await
            .unwrap();

        let err = update(
            &pool,
            "acme",
            jane.id,
            EmployeeUpdate {
                email: Some("JOHN@x.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_update_own_email_case_ok() {
        let pool = test_pool().await;
        let john = create(&pool, "acme", sample("John", "Doe", "john@x.com"))
            .await
            .unwrap();
        let updated = update(
            &pool,
            "acme",
            john.id,
            EmployeeUpdate {
                email: Some("John@X.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.email, "John@X.com");
    }

    #[tokio::test]
    async fn test_update_partial_leaves_rest() {
        let pool = test_pool().await;
        let mut data = sample("John", "Doe", "john@x.com");
        data.title = Some("Engineer".to_string());
        let john = create(&pool, "acme", data).await.unwrap();

        let updated = update(
            &pool,
            "acme",
            john.id,
            EmployeeUpdate {
                department: Some("Platform".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.title.as_deref(), Some("Engineer"));
        assert_eq!(updated.department.as_deref(), Some("Platform"));
    }

    #[tokio::test]
    async fn test_hierarchy_chain_and_reports() {
        let pool = test_pool().await;
        let root = create(&pool, "acme", sample("Ada", "Lovelace", "ada@x.com"))
            .await
            .unwrap();
        let mut mid_data = sample("Grace", "Hopper", "grace@x.com");
        mid_data.manager_id = Some(root.id);
        let mid = create(&pool, "acme", mid_data).await.unwrap();
        let mut leaf_data = sample("Alan", "Turing", "alan@x.com");
        leaf_data.manager_id = Some(mid.id);
        let leaf = create(&pool, "acme", leaf_data).await.unwrap();
        let mut peer_data = sample("Edsger", "Dijkstra", "edsger@x.com");
        peer_data.manager_id = Some(mid.id);
        create(&pool, "acme", peer_data).await.unwrap();

        let hierarchy = get_hierarchy(&pool, "acme", leaf.id).await.unwrap();
        assert_eq!(hierarchy.employee.id, leaf.id);
        // immediate manager first, root last
        assert_eq!(hierarchy.management_chain[0].id, mid.id);
        assert_eq!(hierarchy.management_chain[1].id, root.id);
        assert!(hierarchy.direct_reports.is_empty());

        let mid_hierarchy = get_hierarchy(&pool, "acme", mid.id).await.unwrap();
        // direct reports only, not the full subtree
        assert_eq!(mid_hierarchy.direct_reports.len(), 2);
        assert_eq!(mid_hierarchy.management_chain.len(), 1);
    }

    // ── soft delete / list ──────────────────────────────────────────

    #[tokio::test]
    async fn test_soft_delete_keeps_row() {
        let pool = test_pool().await;
        let john = create(&pool, "acme", sample("John", "Doe", "john@x.com"))
            .await
            .unwrap();

        assert!(soft_delete(&pool, "acme", john.id).await.unwrap());
        // second call: already inactive
        assert!(!soft_delete(&pool, "acme", john.id).await.unwrap());

        // still retrievable by id
        let found = find_by_id(&pool, "acme", john.id).await.unwrap().unwrap();
        assert!(!found.is_active);

        // absent from active listings
        let filters = EmployeeFilters {
            is_active: Some(true),
            ..Default::default()
        };
        let page = find_many(&pool, "acme", &filters, &default_pagination())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_find_many_pagination_totals() {
        let pool = test_pool().await;
        for i in 0..25 {
            create(
                &pool,
                "acme",
                sample("Test", &format!("Person{i:02}"), &format!("p{i}@x.com")),
            )
            .await
            .unwrap();
        }

        let mut pagination = default_pagination();
        pagination.page_size = 10;
        pagination.page = 3;
        let page = find_many(&pool, "acme", &EmployeeFilters::default(), &pagination)
            .await
            .unwrap();
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data.len(), 5);
    }

    #[tokio::test]
    async fn test_find_many_search_case_insensitive() {
        let pool = test_pool().await;
        create(&pool, "acme", sample("John", "Doe", "john@x.com"))
            .await
            .unwrap();
        let mut engineer = sample("Jane", "Smith", "jane@x.com");
        engineer.title = Some("Staff Engineer".to_string());
        create(&pool, "acme", engineer).await.unwrap();

        let filters = EmployeeFilters {
            search: Some("ENGINEER".to_string()),
            ..Default::default()
        };
        let page = find_many(&pool, "acme", &filters, &default_pagination())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].email, "jane@x.com");
    }

    #[tokio::test]
    async fn test_find_many_skills_filter_requires_all() {
        let pool = test_pool().await;
        let mut rustacean = sample("John", "Doe", "john@x.com");
        rustacean.skills = vec!["Rust".to_string(), "SQL".to_string()];
        create(&pool, "acme", rustacean).await.unwrap();
        let mut pythonista = sample("Jane", "Smith", "jane@x.com");
        pythonista.skills = vec!["Python".to_string(), "SQL".to_string()];
        create(&pool, "acme", pythonista).await.unwrap();

        let filters = EmployeeFilters {
            skills: Some(vec!["rust".to_string(), "sql".to_string()]),
            ..Default::default()
        };
        let page = find_many(&pool, "acme", &filters, &default_pagination())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].email, "john@x.com");
    }

    #[tokio::test]
    async fn test_find_many_sort_desc() {
        let pool = test_pool().await;
        create(&pool, "acme", sample("Aa", "Alpha", "a@x.com")).await.unwrap();
        create(&pool, "acme", sample("Zz", "Zulu", "z@x.com")).await.unwrap();

        let mut pagination = default_pagination();
        pagination.sort_order = SortOrder::Desc;
        let page = find_many(&pool, "acme", &EmployeeFilters::default(), &pagination)
            .await
            .unwrap();
        assert_eq!(page.data[0].last_name, "Zulu");
    }

    #[tokio::test]
    async fn test_find_many_scoped_to_tenant() {
        let pool = test_pool().await;
        create(&pool, "acme", sample("John", "Doe", "john@x.com"))
            .await
            .unwrap();
        create(&pool, "globex", sample("Jane", "Smith", "jane@x.com"))
            .await
            .unwrap();

        let page = find_many(
            &pool,
            "acme",
            &EmployeeFilters::default(),
            &default_pagination(),
        )
        .await
        .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].tenant_id, "acme");
    }

    // ── statistics ──────────────────────────────────────────────────

    #[tokio::test]
    async fn test_statistics() {
        let pool = test_pool().await;
        let mut a = sample("John", "Doe", "john@x.com");
        a.department = Some("Platform".to_string());
        a.title = Some("Engineer".to_string());
        let john = create(&pool, "acme", a).await.unwrap();
        let mut b = sample("Jane", "Smith", "jane@x.com");
        b.department = Some("Platform".to_string());
        b.title = Some("Manager".to_string());
        create(&pool, "acme", b).await.unwrap();
        let mut c = sample("Alan", "Turing", "alan@x.com");
        c.department = Some("Research".to_string());
        create(&pool, "acme", c).await.unwrap();

        soft_delete(&pool, "acme", john.id).await.unwrap();

        let stats = get_statistics(&pool, "acme").await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 2);
        // distributions cover active employees only
        assert_eq!(stats.by_department.len(), 2);
        let platform = stats
            .by_department
            .iter()
            .find(|g| g.name == "Platform")
            .unwrap();
        assert_eq!(platform.count, 1);
    }

    // ── batch operations ────────────────────────────────────────────

    #[tokio::test]
    async fn test_bulk_update_partial_failure() {
        let pool = test_pool().await;
        let john = create(&pool, "acme", sample("John", "Doe", "john@x.com"))
            .await
            .unwrap();
        let jane = create(&pool, "acme", sample("Jane", "Smith", "jane@x.com"))
            .await
            .unwrap();
        update(&pool, "acme", john.id, set_manager(Some(jane.id)))
            .await
            .unwrap();

        let summary = bulk_update(
            &pool,
            "acme",
            vec![
                BulkUpdateItem {
                    id: john.id,
                    data: EmployeeUpdate {
                        title: Some("Engineer".to_string()),
                        ..Default::default()
                    },
                },
                // cycle → fails, but must not abort the batch
                BulkUpdateItem {
                    id: jane.id,
                    data: set_manager(Some(john.id)),
                },
                // unknown id → fails
                BulkUpdateItem {
                    id: 999_999,
                    data: EmployeeUpdate {
                        title: Some("Ghost".to_string()),
                        ..Default::default()
                    },
                },
            ],
        )
        .await
        .unwrap();

        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 2);
        assert!(summary.outcomes[0].success);
        assert!(!summary.outcomes[1].success);
        assert!(!summary.outcomes[2].success);

        // the successful item actually landed
        let john_now = find_by_id(&pool, "acme", john.id).await.unwrap().unwrap();
        assert_eq!(john_now.title.as_deref(), Some("Engineer"));
    }

    #[tokio::test]
    async fn test_import_resolves_manager_email() {
        let pool = test_pool().await;
        create(&pool, "acme", sample("Jane", "Smith", "jane@x.com"))
            .await
            .unwrap();

        let rows = vec![
            EmployeeImport {
                data: sample("John", "Doe", "john@x.com"),
                manager_email: Some("jane@x.com".to_string()),
            },
            EmployeeImport {
                data: sample("Alan", "Turing", "alan@x.com"),
                manager_email: Some("nobody@x.com".to_string()),
            },
        ];
        let summary = import(&pool, "acme", rows).await.unwrap();
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 1);

        let john = find_by_email(&pool, "acme", "john@x.com")
            .await
            .unwrap()
            .unwrap();
        let jane = find_by_email(&pool, "acme", "jane@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(john.manager_id, Some(jane.id));
    }
}
