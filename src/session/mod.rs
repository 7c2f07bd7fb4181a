//! Session context: stored credentials with an explicit lifecycle.
//!
//! DESIGN
//! ======
//! `SessionContext` is created once at startup with [`SessionContext::init`],
//! which reads whatever credentials were persisted by a previous run. It is
//! cheap to clone; every clone shares the same in-memory state, so the HTTP
//! client observes a logout issued by the liveness monitor on its next request.
//! [`SessionContext::teardown`] clears both memory and the backing store.
//!
//! ERROR HANDLING
//! ==============
//! A corrupt or unreadable credentials file is logged and treated as "not
//! logged in" rather than aborting startup.

pub mod monitor;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use monitor::{ActivityKind, LivenessMonitor, LogoutHook, MonitorHandle, Phase, Transition, spawn_monitor};

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Token and identity handed out by the external auth service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("credentials io failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("credentials file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

// =============================================================================
// STORES
// =============================================================================

/// Persistent storage for the current credentials.
pub trait CredentialStore: Send + Sync {
    /// Read persisted credentials, `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the storage exists but cannot be read or decoded.
    fn load(&self) -> Result<Option<Credentials>, StoreError>;

    /// Persist credentials, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the storage cannot be written.
    fn save(&self, credentials: &Credentials) -> Result<(), StoreError>;

    /// Remove persisted credentials. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when existing storage cannot be removed.
    fn clear(&self) -> Result<(), StoreError>;
}

/// JSON file store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileStore {
    fn load(&self) -> Result<Option<Credentials>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(credentials)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// In-process store for embedders that persist nothing between runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Credentials>>,
}

impl MemoryStore {
    #[must_use]
    pub fn with(credentials: Credentials) -> Self {
        Self { slot: Mutex::new(Some(credentials)) }
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Result<Option<Credentials>, StoreError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// =============================================================================
// SESSION CONTEXT
// =============================================================================

#[derive(Clone)]
pub struct SessionContext {
    current: Arc<RwLock<Option<Credentials>>>,
    store: Arc<dyn CredentialStore>,
}

impl SessionContext {
    /// Start a session context from whatever the store holds.
    pub fn init(store: Arc<dyn CredentialStore>) -> Self {
        let current = match store.load() {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable stored credentials");
                None
            }
        };
        Self { current: Arc::new(RwLock::new(current)), store }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.current.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|c| c.token.clone())
    }

    /// Persist new credentials and make them current.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if persisting fails; the in-memory state is left unchanged.
    pub fn login(&self, credentials: Credentials) -> Result<(), StoreError> {
        self.store.save(&credentials)?;
        info!(user_id = ?credentials.user_id, "session started");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(credentials);
        Ok(())
    }

    /// Forget the current credentials in memory and in storage.
    pub fn teardown(&self) {
        let had_session = self.current.write().unwrap_or_else(PoisonError::into_inner).take().is_some();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear stored credentials");
        }
        if had_session {
            info!("session cleared");
        }
    }
}

#[async_trait::async_trait]
impl LogoutHook for SessionContext {
    async fn logout(&self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
