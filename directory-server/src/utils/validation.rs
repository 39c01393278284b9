//! Input validation layer
//!
//! Centralized limits and validation functions for employee payloads.
//! Everything here is synchronous, side-effect free and never touches
//! storage: input is either normalized (trimmed, defaulted) or rejected
//! with every violation listed — never just the first.
//!
//! Error messages use the wire field names (camelCase) so they can be
//! surfaced to API callers verbatim.

use std::collections::HashSet;

use serde_json::Value;
use shared::models::{
    BulkUpdateItem, CustomFieldValues, EmployeeCreate, EmployeeFilters, EmployeeImport,
    EmployeeImportRow, EmployeeUpdate, Pagination, PaginationParams, SortField, SortOrder,
};

// ── Field limits ────────────────────────────────────────────────────

/// Person names (first/last)
pub const MAX_NAME_LEN: usize = 100;

/// Title, department, office location
pub const MAX_TEXT_LEN: usize = 200;

/// Email addresses
pub const MAX_EMAIL_LEN: usize = 255;

/// Phone numbers (digits plus common separators)
pub const MAX_PHONE_LEN: usize = 50;

/// Minimum digit count for a plausible phone number
pub const MIN_PHONE_DIGITS: usize = 7;

/// Phone extensions (digits only)
pub const MAX_EXTENSION_LEN: usize = 20;

/// Free-form bio
pub const MAX_BIO_LEN: usize = 1000;

/// Skills per employee
pub const MAX_SKILLS: usize = 20;

/// Length of one skill
pub const MAX_SKILL_LEN: usize = 50;

/// Custom field entries per employee
pub const MAX_CUSTOM_FIELDS: usize = 50;

/// Length of one custom field string value
pub const MAX_CUSTOM_VALUE_LEN: usize = 500;

/// Elements in one custom field array value
pub const MAX_CUSTOM_ARRAY_LEN: usize = 10;

/// Items per bulk update batch
pub const MAX_BULK_ITEMS: usize = 100;

// ── Pagination defaults ─────────────────────────────────────────────

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_SORT_FIELD: SortField = SortField::LastName;

// ── Error types ─────────────────────────────────────────────────────

/// Validation failure carrying every violation found
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .errors.join("; "))]
pub struct ValidationError {
    pub errors: Vec<String>,
}

/// Structured result for standalone list checks (skills, custom fields)
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCheck {
    pub valid: bool,
    pub errors: Vec<String>,
}

// ── Standalone predicates ───────────────────────────────────────────

/// Lenient phone check: at least 7 digits, only digits and common
/// separators (space, `-`, `+`, `(`, `)`, `.`)
pub fn validate_phone_number(phone: &str) -> bool {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    digits >= MIN_PHONE_DIGITS
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '+' | '(' | ')' | '.'))
}

/// Structural email check: exactly one `@`, non-empty local part, dotted
/// domain of alphanumerics/hyphens
pub fn validate_email_domain(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || local.chars().any(char::is_whitespace) || domain.contains('@') {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return false;
    }
    domain.contains('.')
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

/// Custom field names follow the identifier pattern `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ── Per-field checks ────────────────────────────────────────────────

fn is_valid_person_name(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_alphabetic() || matches!(c, '-' | '\'' | ' '))
}

fn check_person_name(errors: &mut Vec<String>, field: &str, value: &str) {
    if value.is_empty() {
        errors.push(format!("{field}: must not be empty"));
        return;
    }
    if value.len() > MAX_NAME_LEN {
        errors.push(format!(
            "{field}: too long ({} chars, max {MAX_NAME_LEN})",
            value.len()
        ));
    }
    if !is_valid_person_name(value) {
        errors.push(format!(
            "{field}: may only contain letters, hyphens, apostrophes and spaces"
        ));
    }
}

fn check_email(errors: &mut Vec<String>, field: &str, value: &str) {
    if value.is_empty() {
        errors.push(format!("{field}: must not be empty"));
        return;
    }
    if value.len() > MAX_EMAIL_LEN {
        errors.push(format!(
            "{field}: too long ({} chars, max {MAX_EMAIL_LEN})",
            value.len()
        ));
    }
    if !validate_email_domain(value) {
        errors.push(format!("{field}: invalid email format"));
    }
}

fn check_optional_len(errors: &mut Vec<String>, field: &str, value: Option<&str>, max_len: usize) {
    if let Some(v) = value
        && v.len() > max_len
    {
        errors.push(format!("{field}: too long ({} chars, max {max_len})", v.len()));
    }
}

fn check_phone(errors: &mut Vec<String>, value: Option<&str>) {
    if let Some(phone) = value {
        if phone.len() > MAX_PHONE_LEN {
            errors.push(format!(
                "phone: too long ({} chars, max {MAX_PHONE_LEN})",
                phone.len()
            ));
        }
        if !validate_phone_number(phone) {
            errors.push("phone: invalid phone number".to_string());
        }
    }
}

fn check_extension(errors: &mut Vec<String>, value: Option<&str>) {
    if let Some(ext) = value {
        if ext.len() > MAX_EXTENSION_LEN {
            errors.push(format!(
                "extension: too long ({} chars, max {MAX_EXTENSION_LEN})",
                ext.len()
            ));
        }
        if !ext.chars().all(|c| c.is_ascii_digit()) {
            errors.push("extension: digits only".to_string());
        }
    }
}

// ── Normalization helpers ───────────────────────────────────────────

fn normalize_opt(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Payload validation ──────────────────────────────────────────────

/// Validate and normalize a create payload.
///
/// `firstName`, `lastName` and `email` are required; everything else is
/// optional. On success the returned payload is trimmed and contains
/// exactly the recognized fields (serde already dropped unknown keys).
pub fn validate_create_employee(
    mut input: EmployeeCreate,
) -> Result<EmployeeCreate, ValidationError> {
    let mut errors = Vec::new();

    input.first_name = input.first_name.trim().to_string();
    input.last_name = input.last_name.trim().to_string();
    input.email = input.email.trim().to_string();
    input.phone = normalize_opt(input.phone);
    input.extension = normalize_opt(input.extension);
    input.title = normalize_opt(input.title);
    input.department = normalize_opt(input.department);
    input.office_location = normalize_opt(input.office_location);
    input.bio = normalize_opt(input.bio);
    input.skills = input.skills.iter().map(|s| s.trim().to_string()).collect();

    check_person_name(&mut errors, "firstName", &input.first_name);
    check_person_name(&mut errors, "lastName", &input.last_name);
    check_email(&mut errors, "email", &input.email);
    check_optional_len(&mut errors, "title", input.title.as_deref(), MAX_TEXT_LEN);
    check_optional_len(
        &mut errors,
        "department",
        input.department.as_deref(),
        MAX_TEXT_LEN,
    );
    check_optional_len(
        &mut errors,
        "officeLocation",
        input.office_location.as_deref(),
        MAX_TEXT_LEN,
    );
    check_phone(&mut errors, input.phone.as_deref());
    check_extension(&mut errors, input.extension.as_deref());
    check_optional_len(&mut errors, "bio", input.bio.as_deref(), MAX_BIO_LEN);

    errors.extend(validate_skills(&input.skills).errors);
    errors.extend(validate_custom_fields(&input.custom_fields).errors);

    if errors.is_empty() {
        Ok(input)
    } else {
        Err(ValidationError { errors })
    }
}

/// Validate and normalize an update payload.
///
/// Same per-field rules as create, but every field is optional. A fully
/// empty update is rejected.
pub fn validate_update_employee(
    mut input: EmployeeUpdate,
) -> Result<EmployeeUpdate, ValidationError> {
    if input.is_empty() {
        return Err(ValidationError {
            errors: vec!["at least one field must be provided".to_string()],
        });
    }

    let mut errors = Vec::new();

    // required-if-present fields keep empty strings so they fail below;
    // optional text fields drop to None when blank
    input.first_name = input.first_name.map(|s| s.trim().to_string());
    input.last_name = input.last_name.map(|s| s.trim().to_string());
    input.email = input.email.map(|s| s.trim().to_string());
    input.phone = normalize_opt(input.phone);
    input.extension = normalize_opt(input.extension);
    input.title = normalize_opt(input.title);
    input.department = normalize_opt(input.department);
    input.office_location = normalize_opt(input.office_location);
    input.bio = normalize_opt(input.bio);
    input.skills = input
        .skills
        .map(|skills| skills.iter().map(|s| s.trim().to_string()).collect());

    if let Some(ref v) = input.first_name {
        check_person_name(&mut errors, "firstName", v);
    }
    if let Some(ref v) = input.last_name {
        check_person_name(&mut errors, "lastName", v);
    }
    if let Some(ref v) = input.email {
        check_email(&mut errors, "email", v);
    }
    check_optional_len(&mut errors, "title", input.title.as_deref(), MAX_TEXT_LEN);
    check_optional_len(
        &mut errors,
        "department",
        input.department.as_deref(),
        MAX_TEXT_LEN,
    );
    check_optional_len(
        &mut errors,
        "officeLocation",
        input.office_location.as_deref(),
        MAX_TEXT_LEN,
    );
    check_phone(&mut errors, input.phone.as_deref());
    check_extension(&mut errors, input.extension.as_deref());
    check_optional_len(&mut errors, "bio", input.bio.as_deref(), MAX_BIO_LEN);

    if let Some(ref skills) = input.skills {
        errors.extend(validate_skills(skills).errors);
    }
    if let Some(ref custom_fields) = input.custom_fields {
        errors.extend(validate_custom_fields(custom_fields).errors);
    }

    if errors.is_empty() {
        Ok(input)
    } else {
        Err(ValidationError { errors })
    }
}

/// Bound-check pagination, filling in defaults for missing fields
/// (`page=1`, `pageSize=20`, `sortBy=lastName`, `sortOrder=asc`)
pub fn validate_pagination(params: &PaginationParams) -> Result<Pagination, ValidationError> {
    let mut errors = Vec::new();

    let page = params.page.unwrap_or(DEFAULT_PAGE);
    if page < 1 {
        errors.push("page: must be at least 1".to_string());
    }

    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        errors.push(format!(
            "pageSize: must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
        ));
    }

    let sort_by = match params.sort_by.as_deref() {
        None => DEFAULT_SORT_FIELD,
        Some(raw) => match SortField::parse(raw) {
            Some(field) => field,
            None => {
                errors.push(format!("sortBy: unknown sort field '{raw}'"));
                DEFAULT_SORT_FIELD
            }
        },
    };

    let sort_order = match params.sort_order.as_deref() {
        None => SortOrder::Asc,
        Some(raw) => match SortOrder::parse(raw) {
            Some(order) => order,
            None => {
                errors.push(format!("sortOrder: must be 'asc' or 'desc', got '{raw}'"));
                SortOrder::Asc
            }
        },
    };

    if errors.is_empty() {
        Ok(Pagination {
            page,
            page_size,
            sort_by,
            sort_order,
        })
    } else {
        Err(ValidationError { errors })
    }
}

/// Validate and normalize list filters
pub fn validate_employee_filters(
    mut filters: EmployeeFilters,
) -> Result<EmployeeFilters, ValidationError> {
    let mut errors = Vec::new();

    filters.search = normalize_opt(filters.search);
    filters.department = normalize_opt(filters.department);
    filters.title = normalize_opt(filters.title);
    check_optional_len(
        &mut errors,
        "department",
        filters.department.as_deref(),
        MAX_TEXT_LEN,
    );
    check_optional_len(&mut errors, "title", filters.title.as_deref(), MAX_TEXT_LEN);
    check_optional_len(&mut errors, "search", filters.search.as_deref(), MAX_TEXT_LEN);

    if let Some(skills) = filters.skills {
        let skills: Vec<String> = skills
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if skills.len() > MAX_SKILLS {
            errors.push(format!("skills: at most {MAX_SKILLS} skills per filter"));
        }
        for skill in &skills {
            if skill.len() > MAX_SKILL_LEN {
                errors.push(format!(
                    "skills: '{skill}' too long ({} chars, max {MAX_SKILL_LEN})",
                    skill.len()
                ));
            }
        }
        filters.skills = if skills.is_empty() { None } else { Some(skills) };
    }

    if errors.is_empty() {
        Ok(filters)
    } else {
        Err(ValidationError { errors })
    }
}

/// Check a skills list: empty entries, over-long entries, more than 20
/// skills and case-insensitive duplicates all invalidate
pub fn validate_skills(skills: &[String]) -> FieldCheck {
    let mut errors = Vec::new();

    if skills.len() > MAX_SKILLS {
        errors.push(format!(
            "skills: at most {MAX_SKILLS} skills allowed, got {}",
            skills.len()
        ));
    }

    let mut seen = HashSet::new();
    for (i, skill) in skills.iter().enumerate() {
        let trimmed = skill.trim();
        if trimmed.is_empty() {
            errors.push(format!("skills[{i}]: must not be empty"));
            continue;
        }
        if trimmed.len() > MAX_SKILL_LEN {
            errors.push(format!(
                "skills[{i}]: too long ({} chars, max {MAX_SKILL_LEN})",
                trimmed.len()
            ));
        }
        if !seen.insert(trimmed.to_lowercase()) {
            errors.push(format!("skills[{i}]: duplicate skill '{trimmed}'"));
        }
    }

    FieldCheck {
        valid: errors.is_empty(),
        errors,
    }
}

/// Shape-level check of a custom field values map: field-name pattern,
/// per-value length, array length and total field count. Schema-aware
/// validation (types, options) happens against the tenant's definitions
/// in [`crate::fields`].
pub fn validate_custom_fields(values: &CustomFieldValues) -> FieldCheck {
    let mut errors = Vec::new();

    if values.len() > MAX_CUSTOM_FIELDS {
        errors.push(format!(
            "customFields: at most {MAX_CUSTOM_FIELDS} fields allowed, got {}",
            values.len()
        ));
    }

    for (name, value) in values {
        if !is_valid_field_name(name) {
            errors.push(format!("customFields.{name}: invalid field name"));
        }
        check_custom_value(&mut errors, name, value);
    }

    FieldCheck {
        valid: errors.is_empty(),
        errors,
    }
}

fn check_custom_value(errors: &mut Vec<String>, name: &str, value: &Value) {
    match value {
        Value::String(s) => {
            if s.len() > MAX_CUSTOM_VALUE_LEN {
                errors.push(format!(
                    "customFields.{name}: value too long ({} chars, max {MAX_CUSTOM_VALUE_LEN})",
                    s.len()
                ));
            }
        }
        Value::Array(items) => {
            if items.len() > MAX_CUSTOM_ARRAY_LEN {
                errors.push(format!(
                    "customFields.{name}: at most {MAX_CUSTOM_ARRAY_LEN} array elements, got {}",
                    items.len()
                ));
            }
            for item in items {
                match item {
                    Value::String(s) if s.len() > MAX_CUSTOM_VALUE_LEN => {
                        errors.push(format!(
                            "customFields.{name}: array element too long ({} chars, max {MAX_CUSTOM_VALUE_LEN})",
                            s.len()
                        ));
                    }
                    Value::Array(_) | Value::Object(_) => {
                        errors.push(format!(
                            "customFields.{name}: nested values are not allowed"
                        ));
                    }
                    _ => {}
                }
            }
        }
        Value::Object(_) => {
            errors.push(format!("customFields.{name}: nested objects are not allowed"));
        }
        // numbers, booleans and null carry no shape constraints
        _ => {}
    }
}

/// Validate a bulk update batch: caps the batch size and runs every
/// item's data through the update rules, indexing violations by item
pub fn validate_bulk_employees(
    items: Vec<BulkUpdateItem>,
) -> Result<Vec<BulkUpdateItem>, ValidationError> {
    let mut errors = Vec::new();

    if items.is_empty() {
        errors.push("updates: at least one item required".to_string());
    }
    if items.len() > MAX_BULK_ITEMS {
        errors.push(format!(
            "updates: at most {MAX_BULK_ITEMS} items per batch, got {}",
            items.len()
        ));
    }

    let mut normalized = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        match validate_update_employee(item.data) {
            Ok(data) => normalized.push(BulkUpdateItem { id: item.id, data }),
            Err(e) => errors.extend(
                e.errors
                    .into_iter()
                    .map(|msg| format!("updates[{i}]: {msg}")),
            ),
        }
    }

    if errors.is_empty() {
        Ok(normalized)
    } else {
        Err(ValidationError { errors })
    }
}

/// Normalize a loosely-typed import row into the create shape.
///
/// The comma-separated skills string is split and trimmed; the optional
/// `managerEmail` is validated but resolved to an id by the repository.
pub fn validate_import_employee(row: EmployeeImportRow) -> Result<EmployeeImport, ValidationError> {
    let skills = row.skills.as_deref().map(split_skills).unwrap_or_default();

    let data = EmployeeCreate {
        first_name: row.first_name,
        last_name: row.last_name,
        email: row.email,
        phone: row.phone,
        extension: row.extension,
        title: row.title,
        department: row.department,
        office_location: row.office_location,
        manager_id: None,
        bio: row.bio,
        skills,
        custom_fields: CustomFieldValues::new(),
    };

    let mut errors = Vec::new();
    let manager_email = normalize_opt(row.manager_email);
    if let Some(ref email) = manager_email {
        check_email(&mut errors, "managerEmail", email);
    }

    match validate_create_employee(data) {
        Ok(data) if errors.is_empty() => Ok(EmployeeImport {
            data,
            manager_email,
        }),
        Ok(_) => Err(ValidationError { errors }),
        Err(mut e) => {
            e.errors.extend(errors);
            Err(e)
        }
    }
}
