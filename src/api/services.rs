use super::categories::CategoryRef;
use super::{ApiClient, ApiError, ApiResult, normalize};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A service listing. The category association arrives either as a single
/// `category_id` or as a `category_ids` list depending on backend version;
/// both are kept so callers can consult whichever is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category_ids: Option<Vec<CategoryRef>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub created_by: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Service {
    /// Category references regardless of which form the backend sent.
    pub fn category_refs(&self) -> Vec<CategoryRef> {
        match (&self.category_ids, self.category_id) {
            (Some(ids), _) => ids.clone(),
            (None, Some(id)) => vec![CategoryRef::Id(id)],
            (None, None) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub category_id: i64,
    pub location: String,
    pub city: String,
    pub address: String,
    pub short_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Partial update; only the fields present are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateServiceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
}

pub struct ServicesApi {
    client: ApiClient,
}

impl ServicesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<Service>> {
        let raw: Value = self.client.get("/all-services").await?;
        normalize::typed_list(raw)
    }

    /// The backend has no single-service endpoint; fetch the list and filter.
    pub async fn get(&self, id: i64) -> ApiResult<Option<Service>> {
        let services = self.list().await?;
        Ok(services.into_iter().find(|s| s.id == id))
    }

    pub async fn create(&self, request: &CreateServiceRequest) -> ApiResult<Service> {
        let raw: Value = self.client.post("/add-service", request).await?;
        normalize::typed_record(raw)?
            .ok_or_else(|| ApiError::Shape("create returned no service".to_string()))
    }

    pub async fn update(&self, id: i64, request: &UpdateServiceRequest) -> ApiResult<Service> {
        let endpoint = format!("/services/{}", id);
        let raw: Value = self.client.put(&endpoint, request).await?;
        normalize::typed_record(raw)?
            .ok_or_else(|| ApiError::Shape("update returned no service".to_string()))
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let endpoint = format!("/services/{}", id);
        self.client.delete(&endpoint).await
    }
}
