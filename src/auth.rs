use crate::api::auth::{AuthApi, LoginCredentials};
use crate::api::{ApiClient, ApiResult};
use crate::store::{StoredSession, TokenStore};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Display fields cached for the signed-in admin. Everything is optional;
/// some backend versions return no user record at all on login.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Uninitialized,
    Anonymous,
    Authenticated { user: Option<Account> },
}

/// Shared session state. Cloning hands out another reference to the same
/// underlying state, so the HTTP client and the application observe the
/// same transitions.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Mutex<AuthState>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(AuthState::Uninitialized)),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AuthState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> AuthState {
        self.lock().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.lock(), AuthState::Authenticated { .. })
    }

    pub fn set_anonymous(&self) {
        *self.lock() = AuthState::Anonymous;
    }

    pub fn set_authenticated(&self, user: Option<Account>) {
        *self.lock() = AuthState::Authenticated { user };
    }

    /// Drop to anonymous in response to an authentication failure. Returns
    /// whether a transition actually happened, so several failing calls
    /// arriving at once produce exactly one.
    pub fn force_anonymous(&self) -> bool {
        let mut state = self.lock();
        if matches!(*state, AuthState::Authenticated { .. }) {
            *state = AuthState::Anonymous;
            true
        } else {
            false
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Login/logout operations tied to the persisted token store and the shared
/// session. Created once at startup and passed to whatever consumes it.
pub struct AuthContext {
    api: AuthApi,
    store: TokenStore,
    session: Session,
}

impl AuthContext {
    pub fn new(client: ApiClient, store: TokenStore, session: Session) -> Self {
        Self {
            api: AuthApi::new(client),
            store,
            session,
        }
    }

    /// Restore session state from the persisted token. With a token present
    /// we are authenticated with whatever user fields were cached at login;
    /// otherwise anonymous.
    pub fn initialize(&self) {
        match self.store.load() {
            Some(stored) => {
                info!("restored session from persisted token");
                self.session.set_authenticated(stored.user);
            }
            None => self.session.set_anonymous(),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Option<Account>> {
        let credentials = LoginCredentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let outcome = self.api.login(&credentials).await?;

        let stored = StoredSession {
            token: outcome.token,
            user: outcome.user.clone(),
        };
        if let Err(e) = self.store.save(&stored) {
            // The login itself succeeded; it just won't survive a restart.
            warn!("failed to persist session: {e}");
        }
        self.session.set_authenticated(outcome.user.clone());
        Ok(outcome.user)
    }

    pub fn logout(&self) {
        if let Err(e) = self.store.clear() {
            warn!("failed to clear persisted session: {e}");
        }
        self.session.set_anonymous();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_user(&self) -> Option<Account> {
        match self.session.state() {
            AuthState::Authenticated { user } => user,
            _ => None,
        }
    }
}
