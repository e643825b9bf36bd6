use super::{ApiError, ApiResult};
use crate::auth::Session;
use crate::config::ApiConfig;
use crate::store::TokenStore;
use reqwest::{Client, Response};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

/// HTTP client for the Nesti backend. Attaches the bearer token resolved
/// from the persisted store (falling back to the statically configured one)
/// and classifies failures into [`ApiError`]. A 401 from any endpoint clears
/// the persisted token and forces the shared session to anonymous; the
/// failing call still returns an error so the caller can report it.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
    store: TokenStore,
    session: Session,
}

impl ApiClient {
    pub fn new(config: ApiConfig, store: TokenStore, session: Session) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            config,
            store,
            session,
        })
    }

    /// Token attached to outgoing requests: a persisted login wins over the
    /// static fallback token.
    fn resolve_token(&self) -> Option<String> {
        self.store
            .token()
            .or_else(|| self.config.fallback_token.clone())
    }

    fn request(&self, method: reqwest::Method, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url, endpoint);
        debug!(%method, %url, "dispatching API request");
        let mut request = self.client.request(method, &url);
        if let Some(token) = self.resolve_token() {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        request
    }

    fn classify_error(&self, status: u16, body: String) -> ApiError {
        match status {
            401 => {
                self.on_unauthorized();
                ApiError::Auth(body)
            }
            400 => ApiError::BadRequest(body),
            404 => ApiError::NotFound(body),
            500..=599 => ApiError::Server(body),
            _ => ApiError::Status {
                status,
                message: body,
            },
        }
    }

    /// Backend rejected our credentials: drop the persisted token and move
    /// the session to anonymous. Safe to hit from several failing calls at
    /// once; only the first actually transitions.
    fn on_unauthorized(&self) {
        if let Err(e) = self.store.clear() {
            warn!("failed to clear persisted session: {e}");
        }
        if self.session.force_anonymous() {
            warn!("authentication rejected by backend, session cleared");
        }
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ApiResult<T> {
        let status = response.status();

        if status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| ApiError::Network(format!("failed to read response body: {e}")))?;
            serde_json::from_str::<T>(&body)
                .map_err(|e| ApiError::Shape(format!("failed to parse response: {e}")))
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(self.classify_error(status.as_u16(), error_text))
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        let response = self.request(reqwest::Method::GET, endpoint).send().await?;
        self.handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self
            .request(reqwest::Method::POST, endpoint)
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self
            .request(reqwest::Method::PUT, endpoint)
            .json(body)
            .send()
            .await?;
        self.handle_response(response).await
    }

    pub async fn delete(&self, endpoint: &str) -> ApiResult<()> {
        let response = self
            .request(reqwest::Method::DELETE, endpoint)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(self.classify_error(status.as_u16(), error_text))
        }
    }
}
