//! Helpers to normalize API responses which may be wrapped or shaped
//! differently depending on the backend version serving them.

use super::{ApiError, ApiResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// Wrapper keys probed for list payloads, in priority order.
const LIST_KEYS: [&str; 5] = ["data", "services", "categories", "users", "events"];

/// Wrapper keys probed for single-record payloads after `data`.
const RECORD_KEYS: [&str; 4] = ["service", "category", "event", "user"];

/// Result of decoding a list response of unknown wrapper shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ListPayload {
    Items(Vec<Value>),
    Empty,
}

impl ListPayload {
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            ListPayload::Items(items) => items,
            ListPayload::Empty => Vec::new(),
        }
    }
}

/// Attempt each known list schema in priority order: a bare array, then an
/// object carrying the array under one of the known wrapper keys.
pub fn decode_list(raw: &Value) -> ListPayload {
    if let Value::Array(items) = raw {
        return ListPayload::Items(items.clone());
    }
    if let Value::Object(map) = raw {
        for key in LIST_KEYS {
            if let Some(Value::Array(items)) = map.get(key) {
                return ListPayload::Items(items.clone());
            }
        }
    }
    ListPayload::Empty
}

/// Extract the inner array from a list response. Never fails; unknown shapes
/// degrade to an empty list with a diagnostic warning.
pub fn normalize_list(raw: &Value) -> Vec<Value> {
    match decode_list(raw) {
        ListPayload::Items(items) => items,
        ListPayload::Empty => {
            if !raw.is_null() {
                warn!("unexpected list response shape: {raw}");
            }
            Vec::new()
        }
    }
}

/// Extract a single record from a response. Unwraps `data`, then any of the
/// resource wrapper keys, then accepts the payload only if it carries an
/// identifying field (`id` or `name`).
pub fn normalize_record(raw: &Value) -> Option<Value> {
    if raw.is_null() {
        return None;
    }

    let mut payload = raw;
    if let Some(inner) = payload.get("data") {
        payload = inner;
    }
    for key in RECORD_KEYS {
        if let Some(inner) = payload.get(key) {
            payload = inner;
            break;
        }
    }

    if payload.get("id").is_some() || payload.get("name").is_some() {
        Some(payload.clone())
    } else {
        warn!("unexpected record response shape: {raw}");
        None
    }
}

/// Normalize a list response and deserialize its elements. Wrapper-shape
/// surprises degrade to an empty list; element decode failures surface as a
/// shape error.
pub fn typed_list<T: DeserializeOwned>(raw: Value) -> ApiResult<Vec<T>> {
    let items = normalize_list(&raw);
    serde_json::from_value(Value::Array(items))
        .map_err(|e| ApiError::Shape(format!("failed to decode list elements: {e}")))
}

/// Normalize a record response and deserialize it, if present.
pub fn typed_record<T: DeserializeOwned>(raw: Value) -> ApiResult<Option<T>> {
    match normalize_record(&raw) {
        Some(record) => serde_json::from_value(record)
            .map(Some)
            .map_err(|e| ApiError::Shape(format!("failed to decode record: {e}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn bare_array_passes_through_in_order() {
        let raw = json!([{"id": 3}, {"id": 1}, {"id": 2}]);
        let items = normalize_list(&raw);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["id"], 3);
        assert_eq!(items[2]["id"], 2);
    }

    #[test]
    fn known_wrapper_keys_unwrap() {
        for key in ["data", "services", "categories", "users", "events"] {
            let raw = json!({ key: [{"id": 1}, {"id": 2}] });
            let items = normalize_list(&raw);
            assert_eq!(items.len(), 2, "wrapper key {key}");
        }
    }

    #[test]
    fn data_key_takes_priority() {
        let raw = json!({"services": [{"id": 2}], "data": [{"id": 1}]});
        let items = normalize_list(&raw);
        assert_eq!(items, vec![json!({"id": 1})]);
    }

    #[test]
    fn unknown_shapes_degrade_to_empty() {
        assert!(normalize_list(&Value::Null).is_empty());
        assert!(normalize_list(&json!({"unexpected": 1})).is_empty());
        assert!(normalize_list(&json!("plain string")).is_empty());
        assert!(normalize_list(&json!({"data": "not an array"})).is_empty());
    }

    #[test]
    fn decode_list_reports_empty_for_unknown_shapes() {
        assert_eq!(decode_list(&json!({"unexpected": 1})), ListPayload::Empty);
        assert_eq!(
            decode_list(&json!([1, 2])).into_vec(),
            vec![json!(1), json!(2)]
        );
    }

    #[test]
    fn record_unwraps_data_wrapper() {
        let raw = json!({"data": {"id": 1, "name": "x"}});
        assert_eq!(normalize_record(&raw), Some(json!({"id": 1, "name": "x"})));
    }

    #[test]
    fn record_unwraps_resource_wrappers() {
        let raw = json!({"service": {"id": 5, "name": "clinic"}});
        assert_eq!(normalize_record(&raw).unwrap()["id"], 5);

        let raw = json!({"data": {"event": {"id": 9}}});
        assert_eq!(normalize_record(&raw).unwrap()["id"], 9);
    }

    #[test]
    fn record_accepts_bare_identified_objects() {
        let raw = json!({"id": 4, "city": "Helsinki"});
        assert_eq!(normalize_record(&raw).unwrap()["city"], "Helsinki");

        let raw = json!({"name": "only-a-name"});
        assert!(normalize_record(&raw).is_some());
    }

    #[test]
    fn record_rejects_unidentified_payloads() {
        assert_eq!(normalize_record(&json!({})), None);
        assert_eq!(normalize_record(&Value::Null), None);
        assert_eq!(normalize_record(&json!({"data": {}})), None);
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: i64,
    }

    #[test]
    fn typed_list_decodes_elements() {
        let raw = json!({"data": [{"id": 1}, {"id": 2}]});
        let rows: Vec<Row> = typed_list(raw).unwrap();
        assert_eq!(rows, vec![Row { id: 1 }, Row { id: 2 }]);
    }

    #[test]
    fn typed_list_surfaces_element_mismatch_as_shape_error() {
        let raw = json!([{"id": "not a number"}]);
        let result: ApiResult<Vec<Row>> = typed_list(raw);
        assert!(matches!(result, Err(ApiError::Shape(_))));
    }

    #[test]
    fn typed_record_decodes_or_degrades() {
        let raw = json!({"data": {"id": 1}});
        let row: Option<Row> = typed_record(raw).unwrap();
        assert_eq!(row, Some(Row { id: 1 }));

        let row: Option<Row> = typed_record(json!({})).unwrap();
        assert_eq!(row, None);
    }
}
