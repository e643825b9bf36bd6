use crate::auth::Account;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::warn;

const STORE_DIR: &str = "nesti-admin";
const STORE_FILE: &str = "session.json";

/// Session state persisted between runs: the bearer token plus whatever
/// display fields the backend returned at login time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    #[serde(default)]
    pub user: Option<Account>,
}

impl StoredSession {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: None,
        }
    }
}

/// File-backed token store. Reads are performed on every outgoing request so
/// the client always sees the latest persisted state.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store under the platform config directory, e.g.
    /// `~/.config/nesti-admin/session.json` on Linux.
    pub fn default_location() -> io::Result<Self> {
        let base = dirs::config_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no user config directory available")
        })?;
        Ok(Self {
            path: base.join(STORE_DIR).join(STORE_FILE),
        })
    }

    /// Store at an explicit path. Used by tests and non-standard setups.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the persisted session, if any. An unreadable or corrupt file is
    /// treated as absent rather than an error.
    pub fn load(&self) -> Option<StoredSession> {
        let contents = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = %self.path.display(), "discarding unreadable session file: {e}");
                None
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.load().map(|session| session.token)
    }

    pub fn save(&self, session: &StoredSession) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(session)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, contents)
    }

    /// Remove the persisted session. Missing file is not an error.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, TokenStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::at(dir.path().join("session.json"));
        (dir, store)
    }

    #[test]
    fn save_then_load_roundtrips() {
        let (_dir, store) = temp_store();
        let session = StoredSession {
            token: "abc123".to_string(),
            user: Some(Account {
                id: Some(7),
                name: Some("Admin".to_string()),
                email: Some("admin@nesti.fi".to_string()),
            }),
        };
        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));
        assert_eq!(store.token().as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_file_loads_as_none() {
        let (_dir, store) = temp_store();
        assert_eq!(store.load(), None);
        assert_eq!(store.token(), None);
    }

    #[test]
    fn corrupt_file_loads_as_none() {
        let (_dir, store) = temp_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn clear_removes_token_and_is_idempotent() {
        let (_dir, store) = temp_store();
        store.save(&StoredSession::new("tok")).unwrap();
        store.clear().unwrap();
        assert_eq!(store.token(), None);
        store.clear().unwrap();
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::at(dir.path().join("nested").join("session.json"));
        store.save(&StoredSession::new("tok")).unwrap();
        assert_eq!(store.token().as_deref(), Some("tok"));
    }
}
