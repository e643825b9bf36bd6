use super::{ApiClient, ApiResult, normalize};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Per-service click counters aggregated by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceClickSummary {
    pub service_name: String,
    pub advantage_clicks: i64,
    pub website_visit_clicks: i64,
}

pub struct AnalyticsApi {
    client: ApiClient,
}

impl AnalyticsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The analytics endpoint wraps its list as `{success, message, data}`;
    /// the normalizer handles that alongside the bare-array form.
    pub async fn service_click_summary(&self) -> ApiResult<Vec<ServiceClickSummary>> {
        let raw: Value = self.client.get("/analytics/service-click-summary").await?;
        normalize::typed_list(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn summary_decodes_from_success_wrapper() {
        let raw = json!({
            "success": true,
            "message": "ok",
            "data": [
                {"service_name": "Doula Helsinki", "advantage_clicks": 12, "website_visit_clicks": 40},
            ],
        });
        let rows: Vec<ServiceClickSummary> = normalize::typed_list(raw).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].advantage_clicks, 12);
    }

    #[test]
    fn summary_decodes_from_bare_array() {
        let raw = json!([
            {"service_name": "Kahvila", "advantage_clicks": 0, "website_visit_clicks": 3},
        ]);
        let rows: Vec<ServiceClickSummary> = normalize::typed_list(raw).unwrap();
        assert_eq!(rows[0].website_visit_clicks, 3);
    }
}
