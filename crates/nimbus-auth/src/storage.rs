use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::session::Session;

/// File-based persistence for the signed-in session.
///
/// The session is stored as JSON so that the next launch can go straight to
/// the dashboard, the way the backend SDK remembers its current user.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a session, replacing any previous one
    pub fn store(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).context("Failed to create session directory")?;
        }

        let json = serde_json::to_string_pretty(session)
            .context("Failed to serialize session")?;

        fs::write(&self.path, &json).context("Failed to write session file")?;

        tracing::info!(target: "auth", "Stored session for {} at {:?}", session.identity, self.path);
        Ok(())
    }

    /// Retrieve the stored session
    ///
    /// Returns `Ok(None)` when nothing is stored or the stored session has
    /// expired. A file that cannot be parsed is an error.
    pub fn retrieve(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path).context("Failed to read session file")?;

        let session: Session =
            serde_json::from_str(&json).context("Failed to deserialize session")?;

        if session.is_expired() {
            tracing::info!(target: "auth", "Stored session for {} has expired", session.identity);
            return Ok(None);
        }

        tracing::info!(target: "auth", "Retrieved session for {}", session.identity);
        Ok(Some(session))
    }

    /// Delete the stored session
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).context("Failed to delete session file")?;
            tracing::info!(target: "auth", "Deleted stored session");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::IdentityId;

    fn session(expires_at: i64) -> Session {
        Session {
            identity: IdentityId::new("uid-1"),
            email: "ana@example.com".to_string(),
            id_token: "token".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at,
        }
    }

    #[test]
    fn test_store_and_retrieve() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::new(dir.path().join("nested").join("session.json"));
        let now = chrono::Utc::now().timestamp();

        storage.store(&session(now + 3600)).unwrap();
        let restored = storage.retrieve().unwrap().unwrap();
        assert_eq!(restored.identity.as_str(), "uid-1");
        assert_eq!(restored.email, "ana@example.com");
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::new(dir.path().join("session.json"));
        assert!(storage.retrieve().unwrap().is_none());
    }

    #[test]
    fn test_expired_session_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::new(dir.path().join("session.json"));
        let now = chrono::Utc::now().timestamp();

        storage.store(&session(now - 60)).unwrap();
        assert!(storage.retrieve().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        assert!(SessionStorage::new(path).retrieve().is_err());
    }

    #[test]
    fn test_clear() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SessionStorage::new(dir.path().join("session.json"));
        let now = chrono::Utc::now().timestamp();

        storage.store(&session(now + 3600)).unwrap();
        storage.clear().unwrap();
        assert!(!storage.path().exists());
        // Clearing twice is fine
        storage.clear().unwrap();
    }
}
