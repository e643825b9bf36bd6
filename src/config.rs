use std::env;
use std::time::Duration;

/// API host used when nothing else is configured.
pub const PRODUCTION_API_URL: &str = "https://api.nesticommunity.com/api";

/// Local backend used during development (`NESTI_ENV=development`).
pub const DEVELOPMENT_API_URL: &str = "http://localhost:8000/api";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Static token used when no interactive login has been performed.
    pub fallback_token: Option<String>,
}

impl ApiConfig {
    /// Resolve configuration from the environment.
    ///
    /// `NESTI_API_URL` overrides the base URL entirely; otherwise
    /// `NESTI_ENV=development` (or `dev`) selects the local backend and
    /// production is assumed. `NESTI_API_TOKEN` supplies the fallback token.
    pub fn from_env() -> Self {
        let base_url = env::var("NESTI_API_URL").unwrap_or_else(|_| {
            match env::var("NESTI_ENV").as_deref() {
                Ok("development") | Ok("dev") => DEVELOPMENT_API_URL.to_string(),
                _ => PRODUCTION_API_URL.to_string(),
            }
        });
        let fallback_token = env::var("NESTI_API_TOKEN").ok().filter(|t| !t.is_empty());

        Self {
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            fallback_token,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            env::remove_var("NESTI_API_URL");
            env::remove_var("NESTI_ENV");
            env::remove_var("NESTI_API_TOKEN");
        }
    }

    #[test]
    #[serial]
    fn defaults_to_production_host() {
        clear_env();
        let config = ApiConfig::from_env();
        assert_eq!(config.base_url, PRODUCTION_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.fallback_token.is_none());
    }

    #[test]
    #[serial]
    fn development_env_selects_local_backend() {
        clear_env();
        unsafe { env::set_var("NESTI_ENV", "development") };
        let config = ApiConfig::from_env();
        assert_eq!(config.base_url, DEVELOPMENT_API_URL);
        clear_env();
    }

    #[test]
    #[serial]
    fn explicit_url_wins_over_env_mode() {
        clear_env();
        unsafe {
            env::set_var("NESTI_ENV", "development");
            env::set_var("NESTI_API_URL", "https://staging.example.com/api");
            env::set_var("NESTI_API_TOKEN", "static-token");
        }
        let config = ApiConfig::from_env();
        assert_eq!(config.base_url, "https://staging.example.com/api");
        assert_eq!(config.fallback_token.as_deref(), Some("static-token"));
        clear_env();
    }
}
