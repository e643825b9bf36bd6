use super::{ApiClient, ApiError, ApiResult, normalize};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventCreator {
    pub id: i64,
    pub name: String,
}

/// Price arrives as a number or a string depending on backend version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Amount(f64),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub event_id: Option<i64>,
    #[serde(default)]
    pub images: Option<Value>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub location_extra_info: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub audience_min_age: Option<i64>,
    #[serde(default)]
    pub audience_max_age: Option<i64>,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub secondary_headline: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub event_for: Option<String>,
    #[serde(default)]
    pub publisher_name: Option<String>,
    #[serde(default)]
    pub event_date_time: Option<String>,
    #[serde(default)]
    pub details_url: Option<String>,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub creator: Option<EventCreator>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateEventRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_extra_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_for: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    pub is_active: bool,
    /// Always sent, even when empty; the backend indexes into these.
    pub images: Vec<String>,
    pub category_ids: Vec<i64>,
}

impl Default for CreateEventRequest {
    fn default() -> Self {
        Self {
            name: String::new(),
            short_description: None,
            description: None,
            location: None,
            location_extra_info: None,
            event_for: None,
            start_time: None,
            end_time: None,
            is_active: true,
            images: Vec::new(),
            category_ids: Vec::new(),
        }
    }
}

/// Normalize a timestamp of whatever shape an import source used into UTC
/// RFC 3339. Bare date-times are assumed to be UTC already.
pub fn to_rfc3339_utc(s: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(
            dt.with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        );
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(
                naive
                    .and_utc()
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            );
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(
        date.and_hms_opt(0, 0, 0)?
            .and_utc()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn time_field(raw: &Value, primary: &str, alternate: &str) -> Option<String> {
    string_field(raw, primary)
        .or_else(|| string_field(raw, alternate))
        .and_then(|s| to_rfc3339_utc(&s))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !matches!(s.as_str(), "" | "0" | "false"),
        _ => false,
    }
}

/// Map an arbitrary event-like payload (as produced by import sources with
/// their own key conventions) onto the backend's creation shape. Alternate
/// name keys are accepted, timestamps are normalized to UTC, and events are
/// active unless the payload says otherwise.
pub fn coerce_create_payload(raw: &Value) -> CreateEventRequest {
    let name = string_field(raw, "name")
        .or_else(|| string_field(raw, "title"))
        .or_else(|| string_field(raw, "event_name"))
        .unwrap_or_default();

    let is_active = raw
        .get("is_active")
        .or_else(|| raw.get("active"))
        .map(truthy)
        .unwrap_or(true);

    CreateEventRequest {
        name,
        short_description: string_field(raw, "short_description"),
        description: string_field(raw, "description"),
        location: string_field(raw, "location"),
        location_extra_info: string_field(raw, "location_extra_info"),
        event_for: string_field(raw, "event_for"),
        start_time: time_field(raw, "start_time", "start"),
        end_time: time_field(raw, "end_time", "end"),
        is_active,
        ..Default::default()
    }
}

pub struct EventsApi {
    client: ApiClient,
}

impl EventsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<Event>> {
        let raw: Value = self.client.get("/all-events").await?;
        normalize::typed_list(raw)
    }

    pub async fn create(&self, request: &CreateEventRequest) -> ApiResult<Event> {
        let raw: Value = self.client.post("/add-event", request).await?;
        normalize::typed_record(raw)?
            .ok_or_else(|| ApiError::Shape("create returned no event".to_string()))
    }

    /// Coerce a loosely shaped payload and create the event from it.
    pub async fn create_from_payload(&self, payload: &Value) -> ApiResult<Event> {
        let request = coerce_create_payload(payload);
        self.create(&request).await
    }

    /// The backend edits events via POST rather than PUT.
    pub async fn update(&self, id: i64, request: &CreateEventRequest) -> ApiResult<Event> {
        let endpoint = format!("/edit-event/{}", id);
        let raw: Value = self.client.post(&endpoint, request).await?;
        normalize::typed_record(raw)?
            .ok_or_else(|| ApiError::Shape("update returned no event".to_string()))
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let endpoint = format!("/events/{}", id);
        self.client.delete(&endpoint).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coercion_accepts_alternate_name_keys() {
        assert_eq!(coerce_create_payload(&json!({"title": "Kids day"})).name, "Kids day");
        assert_eq!(
            coerce_create_payload(&json!({"event_name": "Open house"})).name,
            "Open house"
        );
        assert_eq!(
            coerce_create_payload(&json!({"name": "A", "title": "B"})).name,
            "A"
        );
        assert_eq!(coerce_create_payload(&json!({})).name, "");
    }

    #[test]
    fn coercion_normalizes_bare_timestamps_to_utc() {
        let request = coerce_create_payload(&json!({
            "name": "x",
            "start": "2024-05-01T10:00:00",
            "end_time": "2024-05-01 12:30:00",
        }));
        assert_eq!(request.start_time.as_deref(), Some("2024-05-01T10:00:00.000Z"));
        assert_eq!(request.end_time.as_deref(), Some("2024-05-01T12:30:00.000Z"));
    }

    #[test]
    fn coercion_converts_offsets_to_utc() {
        let request = coerce_create_payload(&json!({
            "name": "x",
            "start_time": "2024-05-01T10:00:00+03:00",
        }));
        assert_eq!(request.start_time.as_deref(), Some("2024-05-01T07:00:00.000Z"));
    }

    #[test]
    fn unparseable_times_are_dropped() {
        let request = coerce_create_payload(&json!({"name": "x", "start_time": "next tuesday"}));
        assert_eq!(request.start_time, None);
    }

    #[test]
    fn is_active_defaults_on_and_accepts_variants() {
        assert!(coerce_create_payload(&json!({"name": "x"})).is_active);
        assert!(!coerce_create_payload(&json!({"name": "x", "is_active": false})).is_active);
        assert!(!coerce_create_payload(&json!({"name": "x", "is_active": "0"})).is_active);
        assert!(coerce_create_payload(&json!({"name": "x", "active": 1})).is_active);
    }

    #[test]
    fn array_fields_are_always_present_in_body() {
        let body = serde_json::to_value(coerce_create_payload(&json!({"name": "x"}))).unwrap();
        assert_eq!(body["images"], json!([]));
        assert_eq!(body["category_ids"], json!([]));
    }

    #[test]
    fn event_tolerates_price_as_number_or_string() {
        let event: Event =
            serde_json::from_value(json!({"id": 1, "name": "a", "price": 5.0})).unwrap();
        assert_eq!(event.price, Some(Price::Amount(5.0)));

        let event: Event =
            serde_json::from_value(json!({"id": 2, "name": "b", "price": "free"})).unwrap();
        assert_eq!(event.price, Some(Price::Text("free".to_string())));
    }

    #[test]
    fn date_only_input_becomes_midnight_utc() {
        assert_eq!(
            to_rfc3339_utc("2024-06-15").as_deref(),
            Some("2024-06-15T00:00:00.000Z")
        );
    }
}
