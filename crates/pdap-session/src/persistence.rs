//! Persistence hooks for session state.
//!
//! The session is restored once at startup and saved after every change.
//! [`SessionStorage`] keeps the store independent of where that lives: a
//! browser's session storage, a file for the CLI, or nothing at all.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::state::{BrowsingState, SessionState, UserProfile};

/// Everything about a session that outlives the process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    #[serde(flatten)]
    pub session: SessionState,

    #[serde(default)]
    pub profile: UserProfile,

    #[serde(default)]
    pub browsing: BrowsingState,
}

/// Trait for session storage backends.
pub trait SessionStorage: Send + Sync + std::fmt::Debug {
    /// Load the saved session. `Ok(None)` means nothing was saved.
    fn load(&self) -> Result<Option<PersistedSession>>;

    /// Replace the saved session.
    fn save(&self, session: &PersistedSession) -> Result<()>;
}

/// A no-op storage for in-memory only sessions.
#[derive(Debug, Clone, Default)]
pub struct NoPersistence;

impl SessionStorage for NoPersistence {
    fn load(&self) -> Result<Option<PersistedSession>> {
        Ok(None)
    }

    fn save(&self, _session: &PersistedSession) -> Result<()> {
        Ok(())
    }
}

/// JSON file storage.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the session file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the session file, ending the browsing session.
    pub fn remove(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| {
                Error::Persistence(format!("Failed to delete session file: {}", e))
            })?;
        }
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<PersistedSession>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::Persistence(format!("Failed to read session file: {}", e)))?;

        let session = serde_json::from_str(&content)
            .map_err(|e| Error::Persistence(format!("Failed to parse session file: {}", e)))?;

        Ok(Some(session))
    }

    fn save(&self, session: &PersistedSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::Persistence(format!("Failed to create session directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(session)
            .map_err(|e| Error::Persistence(format!("Failed to serialize session: {}", e)))?;

        std::fs::write(&self.path, json)
            .map_err(|e| Error::Persistence(format!("Failed to write session file: {}", e)))?;

        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }
}
