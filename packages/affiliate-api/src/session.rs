//! Durable session storage.
//!
//! The browser build of the dashboard kept three entries in local storage
//! (access token, refresh token, user record). Here they live in one JSON
//! document written with a temp-file rename, so the group always lands
//! together or not at all.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{ApiError, Result};
use crate::types::LoginResult;

/// Credentials persisted after a successful OTP verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Opaque user record, stored exactly as the backend returned it.
    pub user: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<LoginResult> for Session {
    fn from(result: LoginResult) -> Self {
        Self {
            access_token: result.access_token,
            refresh_token: result.refresh_token,
            user: result.user,
            created_at: Utc::now(),
        }
    }
}

/// Store holding at most one active session.
///
/// Handles are cheap to clone and share the same state. The store is written
/// once per successful verification, read by every authenticated request, and
/// cleared only by logout.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Option<Session>>>,
    path: Option<PathBuf>,
}

impl SessionStore {
    /// Open a file-backed store, loading any previously saved session.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = load_from_disk(&path);
        Self {
            inner: Arc::new(RwLock::new(session)),
            path: Some(path),
        }
    }

    /// Store that never touches disk, for tests and one-shot tools.
    pub fn in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
            path: None,
        }
    }

    /// Default on-disk location under the user config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("affiliate-console")
            .join("session.json")
    }

    /// Persist a session, replacing any existing one.
    pub async fn save(&self, session: Session) -> Result<()> {
        if let Some(path) = &self.path {
            write_to_disk(path, &session)?;
        }
        *self.inner.write().await = Some(session);
        Ok(())
    }

    /// Current session, if any.
    pub async fn get(&self) -> Option<Session> {
        self.inner.read().await.clone()
    }

    /// Access token of the current session, if any.
    pub async fn access_token(&self) -> Option<String> {
        self.inner
            .read()
            .await
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Drop the session and delete the backing file (logout).
    pub async fn clear(&self) -> Result<()> {
        if let Some(path) = &self.path {
            if path.exists() {
                std::fs::remove_file(path).map_err(|e| {
                    ApiError::Storage(format!("failed to remove session file: {e}"))
                })?;
            }
        }
        *self.inner.write().await = None;
        Ok(())
    }
}

fn load_from_disk(path: &Path) -> Option<Session> {
    let data = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&data) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "ignoring unreadable session file");
            None
        }
    }
}

fn write_to_disk(path: &Path, session: &Session) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ApiError::Storage(format!("failed to create session dir: {e}")))?;
    }
    let data = serde_json::to_string_pretty(session)
        .map_err(|e| ApiError::Storage(format!("failed to serialize session: {e}")))?;

    // Write-then-rename keeps a reader from ever seeing a half-written group.
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, data)
        .map_err(|e| ApiError::Storage(format!("failed to write session file: {e}")))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| ApiError::Storage(format!("failed to replace session file: {e}")))?;
    Ok(())
}
