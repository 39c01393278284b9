//! Custom Field Model
//!
//! Tenant-defined, schema-typed attributes attachable to employee records.
//! Definitions are referenced, never owned, by `Employee.custom_fields`.

use serde::{Deserialize, Serialize};

/// Value type of a custom field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Dropdown,
    Multiselect,
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Date => "date",
            Self::Dropdown => "dropdown",
            Self::Multiselect => "multiselect",
            Self::Boolean => "boolean",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "number" => Some(Self::Number),
            "date" => Some(Self::Date),
            "dropdown" => Some(Self::Dropdown),
            "multiselect" => Some(Self::Multiselect),
            "boolean" => Some(Self::Boolean),
            _ => None,
        }
    }

    /// Dropdown and multiselect fields must declare their options
    pub fn requires_options(&self) -> bool {
        matches!(self, Self::Dropdown | Self::Multiselect)
    }
}

/// Custom field definition, scoped to a tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomField {
    pub id: i64,
    pub tenant_id: String,
    /// Unique per tenant; identifier pattern (`[A-Za-z_][A-Za-z0-9_]*`)
    pub field_name: String,
    pub field_type: FieldType,
    pub is_required: bool,
    /// Allowed values for dropdown/multiselect; empty for other types
    pub options: Vec<String>,
    pub display_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create custom field payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldCreate {
    pub field_name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub display_order: i64,
}

/// Update custom field payload.
///
/// Name and type are immutable after creation — changing either would
/// silently orphan existing employee values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldUpdate {
    #[serde(default)]
    pub is_required: Option<bool>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub display_order: Option<i64>,
}
