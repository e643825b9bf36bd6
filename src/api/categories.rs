use super::{ApiClient, ApiError, ApiResult, normalize};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// A category reference as it appears on other records. Older backend
/// versions serialize ids as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(i64),
    Text(String),
}

impl CategoryRef {
    pub fn as_id(&self) -> Option<i64> {
        match self {
            CategoryRef::Id(id) => Some(*id),
            CategoryRef::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Resolve category references to a display string, e.g. for table output.
/// Unknown ids are rendered as-is rather than dropped.
pub fn category_names(refs: &[CategoryRef], categories: &[Category]) -> String {
    if refs.is_empty() {
        return "No categories".to_string();
    }
    let names: Vec<String> = refs
        .iter()
        .map(|r| {
            r.as_id()
                .and_then(|id| categories.iter().find(|c| c.id == id))
                .map(|c| c.name.clone())
                .unwrap_or_else(|| match r {
                    CategoryRef::Id(id) => format!("ID: {id}"),
                    CategoryRef::Text(s) => format!("ID: {s}"),
                })
        })
        .collect();
    names.join(", ")
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateCategoryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub struct CategoriesApi {
    client: ApiClient,
}

impl CategoriesApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> ApiResult<Vec<Category>> {
        let raw: Value = self.client.get("/all-categories").await?;
        normalize::typed_list(raw)
    }

    pub async fn create(&self, request: &CreateCategoryRequest) -> ApiResult<Category> {
        let raw: Value = self.client.post("/add-category", request).await?;
        normalize::typed_record(raw)?
            .ok_or_else(|| ApiError::Shape("create returned no category".to_string()))
    }

    pub async fn update(&self, id: i64, request: &UpdateCategoryRequest) -> ApiResult<Category> {
        let endpoint = format!("/categories/{}", id);
        let raw: Value = self.client.put(&endpoint, request).await?;
        normalize::typed_record(raw)?
            .ok_or_else(|| ApiError::Shape("update returned no category".to_string()))
    }

    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let endpoint = format!("/categories/{}", id);
        self.client.delete(&endpoint).await
    }
}
