//! Dashboard screen: the location broadcast toggle and the weather map.
//!
//! Broadcast diagnostics arrive on a channel and are turned into notices
//! when the user has to act on them (sign in again, grant the permission).
//! Transient failures are only logged.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use nimbus_auth::SessionProvider;
use nimbus_core::{AppError, Screen, ScreenEvent};
use nimbus_location::{
    BroadcastController, BroadcastEvent, BroadcastOptions, BroadcastState, PermissionGate,
    PositionSource, Toggle,
};
use nimbus_map::{MapDocument, OverlaySelector, RenderSurface, SurfaceEvent, WeatherLayer};
use nimbus_store::SharedStore;
use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::error_mapping::IntoAppError;
use crate::navigator::Navigator;

/// A message the user should see and act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: &'static str,
    pub detail: String,
}

impl Notice {
    fn from_error(error: &AppError) -> Self {
        Self {
            message: error.user_message(),
            detail: error.to_string(),
        }
    }
}

pub struct Dashboard<S, G, P, W, R> {
    session: Arc<S>,
    broadcast: BroadcastController<S, G, P, W>,
    map: OverlaySelector<R>,
    events: Mutex<Receiver<BroadcastEvent>>,
    notices: Mutex<Vec<Notice>>,
    navigator: Navigator,
}

impl<S, G, P, W, R> Dashboard<S, G, P, W, R>
where
    S: SessionProvider + 'static,
    G: PermissionGate + 'static,
    P: PositionSource + 'static,
    W: SharedStore + 'static,
    R: RenderSurface,
{
    pub fn new(
        session: Arc<S>,
        gate: Arc<G>,
        position: Arc<P>,
        store: Arc<W>,
        options: BroadcastOptions,
        runtime: Handle,
        map: OverlaySelector<R>,
        navigator: Navigator,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        let broadcast = BroadcastController::with_events(
            Arc::clone(&session),
            gate,
            position,
            store,
            options,
            runtime,
            tx,
        );

        Self {
            session,
            broadcast,
            map,
            events: Mutex::new(rx),
            notices: Mutex::new(Vec::new()),
            navigator,
        }
    }

    // =========== Location broadcast ===========

    /// Flip the broadcast toggle.
    ///
    /// Only a missing session is reported here; everything else shows up
    /// through `poll_events`.
    pub fn set_broadcast_enabled(&self, enabled: bool) -> Result<Toggle, AppError> {
        self.broadcast
            .set_enabled(enabled)
            .map_err(IntoAppError::into_app_error)
    }

    pub fn current_broadcast_enabled(&self) -> bool {
        self.broadcast.is_enabled()
    }

    pub fn broadcast_state(&self) -> BroadcastState {
        self.broadcast.state()
    }

    /// Re-check the session, e.g. after the token was rejected
    pub fn revalidate_session(&self) -> BroadcastState {
        self.broadcast.revalidate_session()
    }

    /// Drain pending broadcast diagnostics. Returns how many new notices
    /// were raised.
    pub fn poll_events(&self) -> usize {
        let events: Vec<BroadcastEvent> = self.events.lock().try_iter().collect();

        let mut raised = 0;
        for event in events {
            match event {
                BroadcastEvent::Failed { cycle, error } if !error.is_recoverable() => {
                    let notice = Notice::from_error(&error.into_app_error());
                    tracing::debug!("Cycle {:?} raised notice: {}", cycle, notice.detail);
                    self.notices.lock().push(notice);
                    raised += 1;
                }
                BroadcastEvent::Failed { cycle, error } => {
                    tracing::debug!("Cycle {:?} failed: {}", cycle, error);
                }
                BroadcastEvent::Broadcast { cycle, position } => {
                    tracing::debug!(
                        "Cycle {} shared ({}, {})",
                        cycle,
                        position.latitude,
                        position.longitude
                    );
                }
                BroadcastEvent::Cancelled { cycle } => {
                    tracing::debug!("Cycle {} cancelled", cycle);
                }
            }
        }
        raised
    }

    /// Notices raised so far, oldest first; clears the list
    pub fn take_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }

    // =========== Weather map ===========

    pub fn select_layer(&self, id: &str) -> Result<MapDocument, AppError> {
        Ok(self.map.select_id(id)?)
    }

    pub fn current_layer(&self) -> WeatherLayer {
        self.map.current_layer()
    }

    pub fn available_layers(&self) -> &'static [WeatherLayer] {
        self.map.available_layers()
    }

    pub fn render_map(&self) -> MapDocument {
        self.map.render()
    }

    pub fn on_surface_event(&self, event: SurfaceEvent) {
        self.map.on_surface_event(event);
    }

    // =========== Session ===========

    /// Stop broadcasting, end the session and go back to the login screen.
    pub fn sign_out(&self) -> Screen {
        self.broadcast.shutdown();
        self.session.sign_out();
        self.navigator.dispatch(ScreenEvent::SignedOut)
    }
}

impl<S, G, P, W, R> Drop for Dashboard<S, G, P, W, R> {
    fn drop(&mut self) {
        self.broadcast.shutdown();
    }
}
