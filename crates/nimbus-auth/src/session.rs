use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::storage::SessionStorage;

/// Opaque identifier of an authenticated user, as issued by the identity backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdentityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An authenticated session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// User identity (backend `localId`)
    pub identity: IdentityId,

    /// Email the user signed in with
    pub email: String,

    /// Bearer token for backend requests
    pub id_token: String,

    /// Optional refresh token for token renewal
    pub refresh_token: Option<String>,

    /// Token expiration timestamp (Unix timestamp)
    pub expires_at: i64,
}

impl Session {
    /// Check if the session's token is expired
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at
    }
}

/// Read access to the current identity plus sign-out.
///
/// This is the only view the location broadcast controller has of the auth
/// system.
pub trait SessionProvider: Send + Sync {
    /// Identity of the signed-in user, or `None` when anonymous or expired
    fn current_identity(&self) -> Option<IdentityId>;

    /// End the current session
    fn sign_out(&self);
}

/// Holds the current session in memory and mirrors it to disk when a
/// `SessionStorage` is attached.
#[derive(Debug, Default)]
pub struct SessionContext {
    current: RwLock<Option<Session>>,
    storage: Option<SessionStorage>,
}

impl SessionContext {
    /// In-memory context with no persistence
    pub fn new() -> Self {
        Self::default()
    }

    /// Context backed by `storage`, restoring any valid stored session.
    ///
    /// An unreadable session file is logged and treated as signed out.
    pub fn with_storage(storage: SessionStorage) -> Self {
        let restored = match storage.retrieve() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(target: "auth", "Ignoring unreadable session file: {:#}", e);
                None
            }
        };

        Self {
            current: RwLock::new(restored),
            storage: Some(storage),
        }
    }

    /// Make `session` the current one, persisting it if storage is attached
    pub fn establish(&self, session: Session) -> anyhow::Result<()> {
        if let Some(storage) = &self.storage {
            storage.store(&session)?;
        }
        tracing::info!(target: "auth", "Signed in as {}", session.identity);
        *self.current.write() = Some(session);
        Ok(())
    }

    /// Snapshot of the current session
    pub fn current(&self) -> Option<Session> {
        self.current.read().clone()
    }

    /// Bearer token of the current session, if any
    pub fn id_token(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.id_token.clone())
    }

    /// True while a session is held and its token has not expired
    pub fn is_authenticated(&self) -> bool {
        self.current_identity().is_some()
    }
}

impl SessionProvider for SessionContext {
    fn current_identity(&self) -> Option<IdentityId> {
        self.current
            .read()
            .as_ref()
            .filter(|s| !s.is_expired())
            .map(|s| s.identity.clone())
    }

    fn sign_out(&self) {
        let previous = self.current.write().take();
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.clear() {
                tracing::error!(target: "auth", "Failed to clear stored session: {:#}", e);
            }
        }
        if let Some(session) = previous {
            tracing::info!(target: "auth", "Signed out {}", session.identity);
        }
    }
}
