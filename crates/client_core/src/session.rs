//! Operator session: the authenticated/admin flag pair and its durable
//! key-value storage.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{info, warn};

pub const AUTHENTICATED_KEY: &str = "isAuthenticated";
pub const ADMIN_KEY: &str = "isAdmin";
const TRUE_VALUE: &str = "true";

/// Stand-in credential pair checked locally.
///
/// This is not a security boundary: anyone with the binary can read it, and
/// the backends do not see it. A real deployment delegates to a
/// backend-issued credential or token flow.
const STAND_IN_ADMIN_USERNAME: &str = "admin";
const STAND_IN_ADMIN_PASSWORD: &str = "admin";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to persist session to '{path}': {source}")]
    Persist {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key-value storage that survives process restarts.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&mut self, key: &str) -> Result<(), SessionError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        self.values.remove(key);
        Ok(())
    }
}

/// A JSON object on disk, rewritten whole on every change.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store. A missing, unreadable or malformed file reads as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!(path = %path.display(), "ignoring malformed session file: {err}");
                BTreeMap::new()
            }),
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!(path = %path.display(), "ignoring unreadable session file: {err}");
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    /// `<local data dir>/evoting_admin/session.json`, when the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|base| base.join("evoting_admin").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), SessionError> {
        let persist_err = |source| SessionError::Persist {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(persist_err)?;
        }
        let raw = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, raw).map_err(persist_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// The single process-wide session, passed explicitly to whoever needs it.
///
/// Both flags are only ever set or cleared together.
#[derive(Debug)]
pub struct Session<S: KeyValueStore> {
    store: S,
    authenticated: bool,
    admin: bool,
}

impl<S: KeyValueStore> Session<S> {
    /// Reads the persisted flags once. Absent values, anything other than
    /// `"true"`, or a pair that disagrees all yield a signed-out session.
    pub fn init(store: S) -> Self {
        let authenticated = store.get(AUTHENTICATED_KEY).as_deref() == Some(TRUE_VALUE);
        let admin = store.get(ADMIN_KEY).as_deref() == Some(TRUE_VALUE);
        let signed_in = authenticated && admin;
        if authenticated != admin {
            warn!("persisted session flags disagree; starting signed out");
        }
        Self {
            store,
            authenticated: signed_in,
            admin: signed_in,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn is_admin(&self) -> bool {
        self.admin
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns `Ok(false)` for any pair other than the stand-in admin
    /// credentials, leaving the session untouched. No lockout or throttling.
    pub fn login(&mut self, username: &str, password: &str) -> Result<bool, SessionError> {
        if username != STAND_IN_ADMIN_USERNAME || password != STAND_IN_ADMIN_PASSWORD {
            warn!("rejected sign-in attempt");
            return Ok(false);
        }

        self.store.set(AUTHENTICATED_KEY, TRUE_VALUE)?;
        if let Err(err) = self.store.set(ADMIN_KEY, TRUE_VALUE) {
            if let Err(rollback) = self.store.remove(AUTHENTICATED_KEY) {
                warn!("failed to roll back partial sign-in: {rollback}");
            }
            return Err(err);
        }
        self.authenticated = true;
        self.admin = true;
        info!("operator signed in");
        Ok(true)
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.authenticated = false;
        self.admin = false;
        self.store.remove(AUTHENTICATED_KEY)?;
        self.store.remove(ADMIN_KEY)?;
        info!("operator signed out");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
