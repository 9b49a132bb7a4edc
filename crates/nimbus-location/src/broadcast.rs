//! Session-gated location broadcast.
//!
//! Enabling the toggle runs one cycle: session check, permission, one
//! position fix, one write to `{locations_path}/{identity}`. Each cycle is a
//! task on the injected runtime and owns a cancellation token; switching the
//! toggle off cancels it so a stale fix is not written after the user opted
//! out. A request already handed to the store may still land.
//!
//! A cycle that was superseded by a later toggle never reports failures;
//! the user has already moved on.
//!
//! Diagnostics go out on an optional `std::sync::mpsc` channel so the UI
//! thread can poll them.

use std::sync::mpsc::Sender;
use std::sync::Arc;

use nimbus_auth::{IdentityId, SessionProvider};
use nimbus_store::{join_path, SharedStore, StoreError};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::permission::PermissionGate;
use crate::position::PositionSource;
use crate::types::{BroadcastError, Capability, PermissionDecision, Position};

const LOG_TARGET: &str = "location_broadcast";

/// Broadcast state as seen by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadcastState {
    #[default]
    Disabled,
    /// A cycle is in flight
    Starting,
    Enabled,
    /// The toggle was on but the session went away; no further writes
    Unauthenticated,
}

/// Result of a toggle request.
#[derive(Debug)]
pub enum Toggle {
    /// A new cycle was started
    Started(CycleHandle),
    /// Broadcasting was already on or starting
    AlreadyActive,
    /// Broadcasting is now off
    Stopped,
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Broadcast(Position),
    Failed(BroadcastError),
    Cancelled,
}

/// Diagnostics emitted while cycles run.
#[derive(Debug, Clone, PartialEq)]
pub enum BroadcastEvent {
    Broadcast { cycle: u64, position: Position },
    Failed { cycle: Option<u64>, error: BroadcastError },
    Cancelled { cycle: u64 },
}

/// Handle to an in-flight cycle
#[derive(Debug)]
pub struct CycleHandle {
    id: u64,
    join: JoinHandle<CycleOutcome>,
}

impl CycleHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the cycle to end
    pub async fn outcome(self) -> CycleOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(target: LOG_TARGET, "Broadcast cycle {} aborted: {}", self.id, e);
                CycleOutcome::Cancelled
            }
        }
    }
}

/// Tunables for the controller
#[derive(Debug, Clone)]
pub struct BroadcastOptions {
    /// Store path prefix; records go to `{locations_path}/{identity}`
    pub locations_path: String,
    /// Cancel the in-flight cycle when the toggle is switched off
    pub cancel_on_disable: bool,
}

impl Default for BroadcastOptions {
    fn default() -> Self {
        Self {
            locations_path: "user_locations".to_string(),
            cancel_on_disable: true,
        }
    }
}

struct ActiveCycle {
    id: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct ControllerState {
    status: BroadcastState,
    cycle: Option<ActiveCycle>,
    /// Cycles left running by a legacy-mode disable
    detached: Vec<ActiveCycle>,
    next_id: u64,
}

struct Shared<S, G, P, W> {
    session: Arc<S>,
    gate: Arc<G>,
    position: Arc<P>,
    store: Arc<W>,
    options: BroadcastOptions,
    runtime: Handle,
    events: Option<Sender<BroadcastEvent>>,
    state: Mutex<ControllerState>,
}

/// Location broadcast controller.
///
/// Cheap to clone; clones share state.
pub struct BroadcastController<S, G, P, W> {
    shared: Arc<Shared<S, G, P, W>>,
}

impl<S, G, P, W> Clone for BroadcastController<S, G, P, W> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S, G, P, W> BroadcastController<S, G, P, W> {
    pub fn state(&self) -> BroadcastState {
        self.shared.state.lock().status
    }

    pub fn is_enabled(&self) -> bool {
        self.state() == BroadcastState::Enabled
    }

    /// Cancel any in-flight cycle regardless of policy and switch off.
    ///
    /// Call on screen teardown.
    pub fn shutdown(&self) {
        let mut state = self.shared.state.lock();
        if let Some(cycle) = state.cycle.take() {
            cycle.token.cancel();
        }
        for cycle in state.detached.drain(..) {
            tracing::debug!(target: LOG_TARGET, "Cancelling detached cycle {}", cycle.id);
            cycle.token.cancel();
        }
        state.status = BroadcastState::Disabled;
    }
}

impl<S, G, P, W> BroadcastController<S, G, P, W>
where
    S: SessionProvider + 'static,
    G: PermissionGate + 'static,
    P: PositionSource + 'static,
    W: SharedStore + 'static,
{
    pub fn new(
        session: Arc<S>,
        gate: Arc<G>,
        position: Arc<P>,
        store: Arc<W>,
        options: BroadcastOptions,
        runtime: Handle,
    ) -> Self {
        Self::build(session, gate, position, store, options, runtime, None)
    }

    /// Like `new`, also reporting diagnostics on `events`
    pub fn with_events(
        session: Arc<S>,
        gate: Arc<G>,
        position: Arc<P>,
        store: Arc<W>,
        options: BroadcastOptions,
        runtime: Handle,
        events: Sender<BroadcastEvent>,
    ) -> Self {
        Self::build(session, gate, position, store, options, runtime, Some(events))
    }

    fn build(
        session: Arc<S>,
        gate: Arc<G>,
        position: Arc<P>,
        store: Arc<W>,
        options: BroadcastOptions,
        runtime: Handle,
        events: Option<Sender<BroadcastEvent>>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                session,
                gate,
                position,
                store,
                options,
                runtime,
                events,
                state: Mutex::new(ControllerState::default()),
            }),
        }
    }

    /// Switch broadcasting on or off.
    ///
    /// Turning it on with no signed-in user is rejected up front with
    /// `Unauthenticated`. Everything that goes wrong later is reported on
    /// the diagnostic channel. Turning it off never fails.
    pub fn set_enabled(&self, enabled: bool) -> Result<Toggle, BroadcastError> {
        if enabled {
            self.enable()
        } else {
            Ok(self.disable())
        }
    }

    fn enable(&self) -> Result<Toggle, BroadcastError> {
        let identity = self.shared.session.current_identity();

        let mut state = self.shared.state.lock();
        if matches!(state.status, BroadcastState::Starting | BroadcastState::Enabled) {
            return Ok(Toggle::AlreadyActive);
        }

        let Some(identity) = identity else {
            state.status = BroadcastState::Disabled;
            drop(state);
            tracing::error!(target: LOG_TARGET, "User is not logged in.");
            self.emit(BroadcastEvent::Failed {
                cycle: None,
                error: BroadcastError::Unauthenticated,
            });
            return Err(BroadcastError::Unauthenticated);
        };

        state.next_id += 1;
        let id = state.next_id;
        let token = CancellationToken::new();
        state.cycle = Some(ActiveCycle {
            id,
            token: token.clone(),
        });
        state.status = BroadcastState::Starting;
        drop(state);

        tracing::debug!(target: LOG_TARGET, "Starting broadcast cycle {} for {}", id, identity);
        let this = self.clone();
        let join = self
            .shared
            .runtime
            .spawn(async move { this.run_cycle(id, identity, token).await });

        Ok(Toggle::Started(CycleHandle { id, join }))
    }

    fn disable(&self) -> Toggle {
        let mut state = self.shared.state.lock();
        if let Some(cycle) = state.cycle.take() {
            if self.shared.options.cancel_on_disable {
                tracing::debug!(target: LOG_TARGET, "Cancelling broadcast cycle {}", cycle.id);
                cycle.token.cancel();
            } else if state.status == BroadcastState::Starting {
                tracing::debug!(target: LOG_TARGET, "Detaching broadcast cycle {}", cycle.id);
                state.detached.push(cycle);
            }
        }
        state.status = BroadcastState::Disabled;
        Toggle::Stopped
    }

    /// Re-check the session after an auth change.
    ///
    /// An active broadcast whose session has gone moves to
    /// `Unauthenticated`, cancelling any in-flight cycle.
    pub fn revalidate_session(&self) -> BroadcastState {
        let identity = self.shared.session.current_identity();

        let mut state = self.shared.state.lock();
        let active = matches!(state.status, BroadcastState::Starting | BroadcastState::Enabled);
        if !active || identity.is_some() {
            return state.status;
        }

        let cycle = state.cycle.take();
        if let Some(cycle) = &cycle {
            cycle.token.cancel();
        }
        state.status = BroadcastState::Unauthenticated;
        drop(state);

        tracing::error!(target: LOG_TARGET, "Session ended while broadcasting");
        self.emit(BroadcastEvent::Failed {
            cycle: cycle.map(|c| c.id),
            error: BroadcastError::Unauthenticated,
        });
        BroadcastState::Unauthenticated
    }

    async fn run_cycle(
        self,
        id: u64,
        identity: IdentityId,
        token: CancellationToken,
    ) -> CycleOutcome {
        let capability = Capability::FineLocation;

        if !self.shared.gate.is_granted(capability) {
            tracing::info!(target: LOG_TARGET, "Requesting {} permission", capability.as_str());
            let decision = tokio::select! {
                biased;
                _ = token.cancelled() => return self.cancelled(id),
                decision = self.shared.gate.request(capability) => decision,
            };

            if decision == PermissionDecision::Denied {
                tracing::error!(target: LOG_TARGET, "Location permission denied");
                return self.finish(id, BroadcastError::PermissionDenied, BroadcastState::Disabled);
            }
        }

        let fix = tokio::select! {
            biased;
            _ = token.cancelled() => return self.cancelled(id),
            fix = self.shared.position.get_once() => fix,
        };

        let position = match fix {
            Ok(Some(position)) if position.is_valid() => position,
            Ok(Some(position)) => {
                tracing::warn!(target: LOG_TARGET, "Discarding invalid fix {:?}", position);
                return self.finish_recoverable(id, "invalid coordinates".to_string());
            }
            Ok(None) => {
                tracing::warn!(target: LOG_TARGET, "Location is null.");
                return self.finish_recoverable(id, "no fix available".to_string());
            }
            Err(e) => {
                tracing::warn!(target: LOG_TARGET, "Failed to retrieve location: {}", e);
                return self.finish_recoverable(id, e.to_string());
            }
        };

        // The session may have ended while we waited for the fix.
        if self.shared.session.current_identity().as_ref() != Some(&identity) {
            tracing::error!(target: LOG_TARGET, "Session changed before write; skipping");
            return self.finish(id, BroadcastError::Unauthenticated, BroadcastState::Unauthenticated);
        }

        let path = join_path(&self.shared.options.locations_path, identity.as_str());
        let written = tokio::select! {
            biased;
            _ = token.cancelled() => return self.cancelled(id),
            written = self.shared.store.write(&path, position.to_record()) => written,
        };

        match written {
            Ok(()) => {
                tracing::info!(target: LOG_TARGET, "Location broadcasted successfully.");
                self.emit(BroadcastEvent::Broadcast { cycle: id, position });
                self.complete(id, BroadcastState::Enabled);
                CycleOutcome::Broadcast(position)
            }
            Err(StoreError::Unauthorized) => {
                tracing::error!(target: LOG_TARGET, "Store rejected the session; stopping broadcast");
                self.finish(id, BroadcastError::Unauthenticated, BroadcastState::Unauthenticated)
            }
            Err(e) => {
                tracing::error!(target: LOG_TARGET, "Failed to broadcast location: {}", e);
                self.finish(
                    id,
                    BroadcastError::StoreWriteFailed(e.to_string()),
                    BroadcastState::Enabled,
                )
            }
        }
    }

    /// The fix failed but the feature stays on.
    fn finish_recoverable(&self, id: u64, reason: String) -> CycleOutcome {
        self.finish(
            id,
            BroadcastError::PositionUnavailable(reason),
            BroadcastState::Enabled,
        )
    }

    fn finish(&self, id: u64, error: BroadcastError, next: BroadcastState) -> CycleOutcome {
        if self.complete(id, next) {
            self.emit(BroadcastEvent::Failed {
                cycle: Some(id),
                error: error.clone(),
            });
        } else {
            tracing::debug!(target: LOG_TARGET, "Dropping '{}' from cycle {}", error, id);
        }
        CycleOutcome::Failed(error)
    }

    fn cancelled(&self, id: u64) -> CycleOutcome {
        tracing::debug!(target: LOG_TARGET, "Broadcast cycle {} cancelled", id);
        self.emit(BroadcastEvent::Cancelled { cycle: id });
        CycleOutcome::Cancelled
    }

    /// Apply the cycle's final state, unless a newer toggle already
    /// superseded it. Returns whether the cycle was still current.
    fn complete(&self, id: u64, next: BroadcastState) -> bool {
        let mut state = self.shared.state.lock();
        state.detached.retain(|c| c.id != id);
        if state.cycle.as_ref().map(|c| c.id) != Some(id) {
            tracing::debug!(target: LOG_TARGET, "Broadcast cycle {} superseded", id);
            return false;
        }

        if next != BroadcastState::Enabled {
            state.cycle = None;
        }
        state.status = next;
        true
    }

    fn emit(&self, event: BroadcastEvent) {
        if let Some(tx) = &self.shared.events {
            // The receiver going away just means nobody is listening any more.
            let _ = tx.send(event);
        }
    }
}
