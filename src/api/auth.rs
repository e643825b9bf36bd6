use super::{ApiClient, ApiError, ApiResult};
use crate::auth::Account;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// What a successful login gives us: the bearer token plus whatever user
/// record the backend chose to include.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub user: Option<Account>,
}

/// The token has moved around between backend versions; probe each known
/// location in priority order.
pub fn extract_token(raw: &Value) -> Option<String> {
    let candidates = [
        raw.get("token"),
        raw.get("access_token"),
        raw.get("data").and_then(|d| d.get("token")),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|v| v.as_str())
        .map(String::from)
}

pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn login(&self, credentials: &LoginCredentials) -> ApiResult<LoginOutcome> {
        let raw: Value = self.client.post("/login", credentials).await?;
        let token = extract_token(&raw)
            .ok_or_else(|| ApiError::Shape("login response carried no token".to_string()))?;
        let user = raw
            .get("user")
            .and_then(|u| serde_json::from_value(u.clone()).ok());
        Ok(LoginOutcome { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn token_extracted_from_each_known_location() {
        assert_eq!(
            extract_token(&json!({"token": "a"})).as_deref(),
            Some("a")
        );
        assert_eq!(
            extract_token(&json!({"access_token": "b"})).as_deref(),
            Some("b")
        );
        assert_eq!(
            extract_token(&json!({"data": {"token": "c"}})).as_deref(),
            Some("c")
        );
    }

    #[test]
    fn top_level_token_wins() {
        let raw = json!({"token": "a", "access_token": "b", "data": {"token": "c"}});
        assert_eq!(extract_token(&raw).as_deref(), Some("a"));
    }

    #[test]
    fn missing_or_non_string_token_is_none() {
        assert_eq!(extract_token(&json!({})), None);
        assert_eq!(extract_token(&json!({"token": 42})), None);
        assert_eq!(extract_token(&json!({"user": {"id": 1}})), None);
    }
}
