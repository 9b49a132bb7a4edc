//! Application services built once from the configuration.
//!
//! `AppServices` owns the tokio runtime and the long-lived collaborators
//! (session, store). Screens get them through constructor injection instead
//! of reaching for globals.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use nimbus_auth::{RestAuthenticator, SessionContext, SessionStorage};
use nimbus_core::{AppError, Config, Screen};
use nimbus_location::{BroadcastOptions, PermissionGate, PositionSource};
use nimbus_map::{MapView, OverlaySelector, RenderSurface, WeatherLayer};
use nimbus_store::{MemoryStore, RestStore, StoreBackend};

use crate::auth_flow::AuthFlow;
use crate::dashboard::Dashboard;
use crate::error_mapping::IntoAppError;
use crate::navigator::Navigator;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Dashboard wired to the live session and store
pub type LiveDashboard<G, P, R> = Dashboard<SessionContext, G, P, StoreBackend, R>;

pub struct AppServices {
    /// Tokio runtime for async operations
    runtime: tokio::runtime::Runtime,

    config: Config,

    /// Signed-in user, restored from disk at startup
    session: Arc<SessionContext>,

    /// Shared location store, authorized with the session token, or the
    /// in-memory store in offline mode
    store: Arc<StoreBackend>,

    navigator: Navigator,
}

impl AppServices {
    pub fn new(config: Config) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("nimbus-tokio")
            .build()
            .context("Failed to create tokio runtime")?;

        let session = Arc::new(SessionContext::with_storage(SessionStorage::new(
            config.session_path(),
        )));

        let store = if config.store.offline {
            tracing::info!("Offline mode: shared store writes stay in memory");
            StoreBackend::Memory(MemoryStore::new())
        } else {
            let rest = RestStore::new(
                &config.store.base_url,
                Duration::from_secs(config.store.request_timeout_secs),
            )
            .context("Failed to create store client")?
            .with_session(Arc::clone(&session));
            StoreBackend::Rest(rest)
        };

        let navigator = Navigator::new(Screen::initial(session.is_authenticated()));
        tracing::info!("Starting on the {} screen", navigator.current().title());

        Ok(Self {
            runtime,
            config,
            session,
            store: Arc::new(store),
            navigator,
        })
    }

    pub fn runtime(&self) -> tokio::runtime::Handle {
        self.runtime.handle().clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> Arc<SessionContext> {
        Arc::clone(&self.session)
    }

    pub fn store(&self) -> Arc<StoreBackend> {
        Arc::clone(&self.store)
    }

    pub fn screen(&self) -> Screen {
        self.navigator.current()
    }

    /// Login/registration flow against the configured identity backend.
    pub fn auth_flow(&self) -> Result<AuthFlow<RestAuthenticator, StoreBackend>, AppError> {
        let authenticator = RestAuthenticator::new(
            &self.config.auth.base_url,
            self.config.auth.api_key.as_deref(),
        )
        .map_err(IntoAppError::into_app_error)?;

        Ok(AuthFlow::new(
            Arc::new(authenticator),
            self.session(),
            self.store(),
            self.config.store.users_path.clone(),
            self.navigator.clone(),
        ))
    }

    /// Overlay selector over `surface`, starting on the configured layer.
    ///
    /// Without a weather API key the page is still generated; its tiles
    /// fail to load and the surface reports that.
    pub fn overlay_selector<R: RenderSurface>(
        &self,
        surface: Arc<R>,
    ) -> Result<OverlaySelector<R>, AppError> {
        let map = &self.config.map;
        let initial = WeatherLayer::parse(&map.default_layer)?;

        let credential = match &map.api_key {
            Some(key) if map.is_configured() => key.clone(),
            _ => {
                tracing::warn!(target: "map", "Weather API key not configured; tiles will not load");
                String::new()
            }
        };
        Ok(OverlaySelector::new(
            credential,
            MapView::from(map),
            initial,
            surface,
        ))
    }

    /// Dashboard for the signed-in user with the platform's permission and
    /// location services.
    pub fn dashboard<G, P, R>(
        &self,
        gate: Arc<G>,
        position: Arc<P>,
        surface: Arc<R>,
    ) -> Result<LiveDashboard<G, P, R>, AppError>
    where
        G: PermissionGate + 'static,
        P: PositionSource + 'static,
        R: RenderSurface,
    {
        let options = BroadcastOptions {
            locations_path: self.config.store.locations_path.clone(),
            cancel_on_disable: self.config.broadcast.cancel_on_disable,
        };

        Ok(Dashboard::new(
            self.session(),
            gate,
            position,
            self.store(),
            options,
            self.runtime(),
            self.overlay_selector(surface)?,
            self.navigator.clone(),
        ))
    }

    /// Stop the runtime, giving in-flight requests a moment to finish.
    pub fn shutdown(self) {
        tracing::info!("AppServices shutdown initiated");
        self.runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
        tracing::info!("AppServices shutdown complete");
    }
}
