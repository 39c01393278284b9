//! Custom field value validation
//!
//! Checks employee `customFields` values against the tenant's field
//! definitions. Pure functions — loading the definitions is the
//! repository's job.

use serde_json::Value;
use shared::models::{CustomField, CustomFieldValues, FieldType};

/// Validate one value against its field definition.
///
/// `null` satisfies any optional field and fails a required one. Numbers
/// are accepted as JSON numbers or numeric strings (import rows arrive
/// stringly typed); dates must be `YYYY-MM-DD` or RFC 3339.
pub fn validate_field_value(def: &CustomField, value: &Value) -> Result<(), String> {
    if value.is_null() {
        if def.is_required {
            return Err(format!("{}: value is required", def.field_name));
        }
        return Ok(());
    }

    match def.field_type {
        // No constraint beyond the required check above
        FieldType::Text => Ok(()),

        FieldType::Number => match value {
            Value::Number(_) => Ok(()),
            Value::String(s) if s.trim().parse::<f64>().is_ok() => Ok(()),
            _ => Err(format!("{}: must be numeric", def.field_name)),
        },

        FieldType::Date => match value.as_str() {
            Some(s) if is_parseable_date(s) => Ok(()),
            _ => Err(format!(
                "{}: must be a date (YYYY-MM-DD or RFC 3339)",
                def.field_name
            )),
        },

        FieldType::Boolean => {
            if value.is_boolean() {
                Ok(())
            } else {
                Err(format!("{}: must be a boolean", def.field_name))
            }
        }

        FieldType::Dropdown => match value.as_str() {
            Some(s) if def.options.iter().any(|o| o == s) => Ok(()),
            Some(s) => Err(format!(
                "{}: '{s}' is not one of the allowed options",
                def.field_name
            )),
            None => Err(format!("{}: must be a string option", def.field_name)),
        },

        FieldType::Multiselect => match value.as_array() {
            Some(items) => {
                for item in items {
                    match item.as_str() {
                        Some(s) if def.options.iter().any(|o| o == s) => {}
                        Some(s) => {
                            return Err(format!(
                                "{}: '{s}' is not one of the allowed options",
                                def.field_name
                            ));
                        }
                        None => {
                            return Err(format!(
                                "{}: selections must be strings",
                                def.field_name
                            ));
                        }
                    }
                }
                Ok(())
            }
            None => Err(format!("{}: must be an array of options", def.field_name)),
        },
    }
}

/// Validate a whole values map against the tenant's definitions.
///
/// Every provided key must name a defined field; every failing value is
/// reported. All violations are collected, never just the first.
pub fn validate_custom_field_values(
    defs: &[CustomField],
    values: &CustomFieldValues,
) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (key, value) in values {
        match defs.iter().find(|d| d.field_name == *key) {
            None => errors.push(format!("{key}: unknown custom field")),
            Some(def) => {
                if let Err(e) = validate_field_value(def, value) {
                    errors.push(e);
                }
            }
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn is_parseable_date(s: &str) -> bool {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
        || chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn def(name: &str, field_type: FieldType, required: bool, options: &[&str]) -> CustomField {
        CustomField {
            id: 1,
            tenant_id: "acme".to_string(),
            field_name: name.to_string(),
            field_type,
            is_required: required,
            options: options.iter().map(|s| s.to_string()).collect(),
            display_order: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_required_rejects_null() {
        let d = def("start_date", FieldType::Date, true, &[]);
        assert!(validate_field_value(&d, &Value::Null).is_err());
    }

    #[test]
    fn test_optional_accepts_null() {
        let d = def("note", FieldType::Text, false, &[]);
        assert!(validate_field_value(&d, &Value::Null).is_ok());
    }

    #[test]
    fn test_number_coercion() {
        let d = def("level", FieldType::Number, false, &[]);
        assert!(validate_field_value(&d, &json!(3)).is_ok());
        assert!(validate_field_value(&d, &json!(3.5)).is_ok());
        assert!(validate_field_value(&d, &json!("42")).is_ok());
        assert!(validate_field_value(&d, &json!("fortytwo")).is_err());
        assert!(validate_field_value(&d, &json!(true)).is_err());
    }

    #[test]
    fn test_date_formats() {
        let d = def("start_date", FieldType::Date, false, &[]);
        assert!(validate_field_value(&d, &json!("2026-01-31")).is_ok());
        assert!(validate_field_value(&d, &json!("2026-01-31T09:00:00Z")).is_ok());
        assert!(validate_field_value(&d, &json!("2026-13-01")).is_err());
        assert!(validate_field_value(&d, &json!("yesterday")).is_err());
    }

    #[test]
    fn test_boolean() {
        let d = def("remote", FieldType::Boolean, false, &[]);
        assert!(validate_field_value(&d, &json!(true)).is_ok());
        assert!(validate_field_value(&d, &json!("true")).is_err());
    }

    #[test]
    fn test_dropdown_membership() {
        let d = def("work_mode", FieldType::Dropdown, false, &["Remote", "Office"]);
        assert!(validate_field_value(&d, &json!("Remote")).is_ok());
        assert!(validate_field_value(&d, &json!("Hybrid")).is_err());
        assert!(validate_field_value(&d, &json!(1)).is_err());
    }

    #[test]
    fn test_multiselect_subset() {
        let d = def(
            "languages",
            FieldType::Multiselect,
            false,
            &["en", "es", "zh"],
        );
        assert!(validate_field_value(&d, &json!(["en", "zh"])).is_ok());
        assert!(validate_field_value(&d, &json!([])).is_ok());
        assert!(validate_field_value(&d, &json!(["en", "fr"])).is_err());
        assert!(validate_field_value(&d, &json!("en")).is_err());
    }

    #[test]
    fn test_values_map_unknown_key() {
        let defs = vec![def("level", FieldType::Number, false, &[])];
        let mut values = CustomFieldValues::new();
        values.insert("level".to_string(), json!(2));
        values.insert("shoe_size".to_string(), json!(43));
        let errors = validate_custom_field_values(&defs, &values).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("unknown custom field"));
    }

    #[test]
    fn test_values_map_collects_all_violations() {
        let defs = vec![
            def("level", FieldType::Number, false, &[]),
            def("work_mode", FieldType::Dropdown, false, &["Remote", "Office"]),
        ];
        let mut values = CustomFieldValues::new();
        values.insert("level".to_string(), json!("senior"));
        values.insert("work_mode".to_string(), json!("Hybrid"));
        let errors = validate_custom_field_values(&defs, &values).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_values_map_ok() {
        let defs = vec![def("level", FieldType::Number, false, &[])];
        let mut values = CustomFieldValues::new();
        values.insert("level".to_string(), json!(2));
        assert!(validate_custom_field_values(&defs, &values).is_ok());
    }
}
