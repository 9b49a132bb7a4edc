//! Login and registration screens.
//!
//! Both forms end on the dashboard once the backend has issued a session.
//! Errors come back as `AppError` so the screen can show `user_message()`.

use std::sync::Arc;

use nimbus_auth::{
    AuthError as DomainAuthError, Authenticator, Credentials, RegistrationForm, SessionContext,
    SessionProvider,
};
use nimbus_core::{AppError, AuthError, Screen, ScreenEvent};
use nimbus_store::{join_path, SharedStore};

use crate::error_mapping::IntoAppError;
use crate::navigator::Navigator;

pub struct AuthFlow<A, W> {
    authenticator: Arc<A>,
    session: Arc<SessionContext>,
    store: Arc<W>,
    users_path: String,
    navigator: Navigator,
}

impl<A: Authenticator, W: SharedStore> AuthFlow<A, W> {
    pub fn new(
        authenticator: Arc<A>,
        session: Arc<SessionContext>,
        store: Arc<W>,
        users_path: impl Into<String>,
        navigator: Navigator,
    ) -> Self {
        Self {
            authenticator,
            session,
            store,
            users_path: users_path.into(),
            navigator,
        }
    }

    pub fn screen(&self) -> Screen {
        self.navigator.current()
    }

    pub fn show_register(&self) -> Screen {
        self.navigator.dispatch(ScreenEvent::SwitchToRegister)
    }

    pub fn show_login(&self) -> Screen {
        self.navigator.dispatch(ScreenEvent::SwitchToLogin)
    }

    /// Sign in from the login screen.
    pub async fn sign_in(&self, credentials: Credentials) -> Result<Screen, AppError> {
        let session = self
            .authenticator
            .sign_in(&credentials)
            .await
            .map_err(|e| rejected("Login", e))?;

        self.session
            .establish(session)
            .map_err(|e| AppError::Auth(AuthError::StorageError(format!("{:#}", e))))?;

        tracing::info!(target: "auth", "Login successful!");
        Ok(self.navigator.dispatch(ScreenEvent::Authenticated))
    }

    /// Create an account and save its profile record.
    ///
    /// The password confirmation is checked before anything is sent. If the
    /// profile cannot be written the new session is dropped and the screen
    /// stays on the form.
    pub async fn register(&self, form: RegistrationForm) -> Result<Screen, AppError> {
        let credentials = form
            .into_credentials()
            .map_err(|e| rejected("Registration", e))?;

        let session = self
            .authenticator
            .register(&credentials)
            .await
            .map_err(|e| rejected("Registration", e))?;

        let identity = session.identity.clone();
        let profile = serde_json::json!({ "email": session.email });

        self.session
            .establish(session)
            .map_err(|e| AppError::Auth(AuthError::StorageError(format!("{:#}", e))))?;

        let path = join_path(&self.users_path, identity.as_str());
        if let Err(e) = self.store.write(&path, profile).await {
            tracing::error!(target: "auth", "Failed to save profile for {}: {}", identity, e);
            self.session.sign_out();
            return Err(e.into_app_error());
        }

        tracing::info!(target: "auth", "Registration successful!");
        Ok(self.navigator.dispatch(ScreenEvent::Authenticated))
    }
}

/// Log a failed auth attempt and convert it for the screen. Form mistakes
/// are expected; anything else is an error.
fn rejected(action: &str, error: DomainAuthError) -> AppError {
    if error.is_input_error() {
        tracing::info!(target: "auth", "{} rejected: {}", action, error);
    } else {
        tracing::error!(target: "auth", "{} failed: {}", action, error);
    }
    error.into_app_error()
}
