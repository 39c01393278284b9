//! Employee Model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::serde_helpers;

/// Open key→value map of tenant-defined custom field values.
///
/// Keys must name a `CustomField` defined by the tenant; values are
/// validated against the field's type before persistence.
pub type CustomFieldValues = Map<String, Value>;

/// Employee entity — one row per employee, scoped to a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    pub tenant_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Unique per tenant (case-insensitive)
    pub email: String,
    pub phone: Option<String>,
    pub extension: Option<String>,
    pub title: Option<String>,
    pub department: Option<String>,
    pub office_location: Option<String>,
    /// Immediate manager; `None` for hierarchy roots.
    /// The manager graph is a forest: no employee is its own ancestor.
    pub manager_id: Option<i64>,
    pub bio: Option<String>,
    pub skills: Vec<String>,
    pub custom_fields: CustomFieldValues,
    /// Soft-delete marker; inactive rows stay in storage
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create employee payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeCreate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub office_location: Option<String>,
    #[serde(default)]
    pub manager_id: Option<i64>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub custom_fields: CustomFieldValues,
}

/// Update employee payload — every field optional.
///
/// Unknown JSON keys are dropped during deserialization, never rejected.
/// `manager_id` distinguishes "absent" (leave unchanged) from `null`
/// (clear the manager, making the employee a hierarchy root).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub office_location: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "serde_helpers::double_option"
    )]
    pub manager_id: Option<Option<i64>>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub custom_fields: Option<CustomFieldValues>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl EmployeeUpdate {
    /// True when no field is present at all
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.extension.is_none()
            && self.title.is_none()
            && self.department.is_none()
            && self.office_location.is_none()
            && self.manager_id.is_none()
            && self.bio.is_none()
            && self.skills.is_none()
            && self.custom_fields.is_none()
            && self.is_active.is_none()
    }
}

/// One row from a bulk import (CSV-shaped, loosely typed)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeImportRow {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub office_location: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    /// Comma-separated skill list, e.g. `"rust, sql"`
    #[serde(default)]
    pub skills: Option<String>,
    /// Email of this employee's manager, resolved to an id at import time
    #[serde(default)]
    pub manager_email: Option<String>,
}

/// Normalized import row — a validated create payload plus the manager lookup
#[derive(Debug, Clone)]
pub struct EmployeeImport {
    pub data: EmployeeCreate,
    pub manager_email: Option<String>,
}

/// One item of a bulk update request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateItem {
    pub id: i64,
    pub data: EmployeeUpdate,
}

/// Per-item outcome of a bulk operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemOutcome {
    pub id: i64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Bulk update summary — items are applied independently; one failure
/// never aborts the rest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateSummary {
    pub successful: u32,
    pub failed: u32,
    pub outcomes: Vec<BulkItemOutcome>,
}

/// Per-row outcome of an import (rows are identified by email, the id is
/// only known after a successful create)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub email: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Import summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub successful: u32,
    pub failed: u32,
    pub outcomes: Vec<ImportOutcome>,
}

/// Employee with its management chain and direct reports.
///
/// `management_chain` is ordered immediate manager first, root last.
/// `direct_reports` contains immediate children only, not the full subtree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeHierarchy {
    pub employee: Employee,
    pub management_chain: Vec<Employee>,
    pub direct_reports: Vec<Employee>,
}

/// One bucket of a distribution (department or title)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount {
    pub name: String,
    pub count: i64,
}

/// Aggregate employee counts for a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStatistics {
    pub total: i64,
    pub active: i64,
    /// Active employees per department
    pub by_department: Vec<GroupCount>,
    /// Active employees per title
    pub by_title: Vec<GroupCount>,
}
