//! Common serde helpers for update payloads

use serde::{Deserialize, Deserializer};

/// Deserialize a doubly-optional field, keeping "absent" and "null" apart.
///
/// - field absent        → `None` (leave unchanged)
/// - field set to `null` → `Some(None)` (clear the value)
/// - field set to `v`    → `Some(Some(v))`
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default, deserialize_with = "super::double_option")]
        manager_id: Option<Option<i64>>,
    }

    #[test]
    fn absent_field_is_none() {
        let p: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(p.manager_id, None);
    }

    #[test]
    fn null_field_is_some_none() {
        let p: Payload = serde_json::from_str(r#"{"manager_id": null}"#).unwrap();
        assert_eq!(p.manager_id, Some(None));
    }

    #[test]
    fn value_field_is_some_some() {
        let p: Payload = serde_json::from_str(r#"{"manager_id": 7}"#).unwrap();
        assert_eq!(p.manager_id, Some(Some(7)));
    }
}
