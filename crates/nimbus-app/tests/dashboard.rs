use std::sync::Arc;

use nimbus_app::{Dashboard, Navigator};
use nimbus_auth::{IdentityId, Session, SessionContext};
use nimbus_core::{AppError, MapError, Screen};
use nimbus_location::{
    BroadcastError, BroadcastOptions, BroadcastState, Capability, CycleOutcome, LocationError,
    PermissionDecision, PermissionGate, Position, PositionSource, Toggle,
};
use nimbus_map::{
    MapDocument, MapView, OverlaySelector, RenderSurface, SurfaceEvent, WeatherLayer,
};
use nimbus_store::{MemoryStore, SharedStore, StoreError};
use parking_lot::Mutex;
use serde_json::json;
use tokio::runtime::Handle;

struct Gate(PermissionDecision);

impl PermissionGate for Gate {
    fn is_granted(&self, _capability: Capability) -> bool {
        false
    }

    async fn request(&self, _capability: Capability) -> PermissionDecision {
        self.0
    }
}

struct Fix;

impl PositionSource for Fix {
    async fn get_once(&self) -> Result<Option<Position>, LocationError> {
        Ok(Some(Position::new(12.88, 121.77)))
    }
}

#[derive(Default)]
struct Screenshots {
    pages: Mutex<Vec<MapDocument>>,
}

impl RenderSurface for Screenshots {
    fn display(&self, document: &MapDocument) -> Option<SurfaceEvent> {
        self.pages.lock().push(document.clone());
        Some(SurfaceEvent::Loaded)
    }
}

/// Rejects every write the way the store does for a revoked token.
struct RevokedStore;

impl SharedStore for RevokedStore {
    async fn write(&self, _path: &str, _value: serde_json::Value) -> Result<(), StoreError> {
        Err(StoreError::Unauthorized)
    }
}

type TestDashboard = Dashboard<SessionContext, Gate, Fix, MemoryStore, Screenshots>;

struct Harness {
    session: Arc<SessionContext>,
    store: Arc<MemoryStore>,
    surface: Arc<Screenshots>,
    navigator: Navigator,
    dashboard: TestDashboard,
}

fn harness(decision: PermissionDecision, signed_in: bool) -> Harness {
    let session = Arc::new(SessionContext::new());
    if signed_in {
        session.establish(session_expiring_at(i64::MAX)).unwrap();
    }

    let store = Arc::new(MemoryStore::new());
    let surface = Arc::new(Screenshots::default());
    let navigator = Navigator::new(Screen::initial(signed_in));
    let map = OverlaySelector::new(
        "owm-key",
        MapView::default(),
        WeatherLayer::default(),
        Arc::clone(&surface),
    );

    let dashboard = Dashboard::new(
        Arc::clone(&session),
        Arc::new(Gate(decision)),
        Arc::new(Fix),
        Arc::clone(&store),
        BroadcastOptions::default(),
        Handle::current(),
        map,
        navigator.clone(),
    );

    Harness {
        session,
        store,
        surface,
        navigator,
        dashboard,
    }
}

fn session_expiring_at(expires_at: i64) -> Session {
    Session {
        identity: IdentityId::new("uid-9"),
        email: "cy@example.com".into(),
        id_token: "token".into(),
        refresh_token: None,
        expires_at,
    }
}

async fn run_cycle(toggle: Toggle) -> CycleOutcome {
    match toggle {
        Toggle::Started(handle) => handle.outcome().await,
        other => panic!("expected a cycle, got {:?}", other),
    }
}

#[tokio::test]
async fn test_broadcast_writes_location() {
    let h = harness(PermissionDecision::Granted, true);

    let outcome = run_cycle(h.dashboard.set_broadcast_enabled(true).unwrap()).await;

    assert!(matches!(outcome, CycleOutcome::Broadcast(_)));
    assert!(h.dashboard.current_broadcast_enabled());
    assert_eq!(
        h.store.get("user_locations/uid-9"),
        Some(json!({"latitude": 12.88, "longitude": 121.77}))
    );
    assert_eq!(h.dashboard.poll_events(), 0);
    assert!(h.dashboard.take_notices().is_empty());
}

#[tokio::test]
async fn test_permission_denied_raises_notice() {
    let h = harness(PermissionDecision::Denied, true);

    run_cycle(h.dashboard.set_broadcast_enabled(true).unwrap()).await;

    assert_eq!(h.dashboard.broadcast_state(), BroadcastState::Disabled);
    assert_eq!(h.dashboard.poll_events(), 1);
    let notices = h.dashboard.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].message.contains("permission"));
    assert!(h.store.is_empty());
    assert!(h.dashboard.take_notices().is_empty());
}

#[tokio::test]
async fn test_anonymous_toggle_is_rejected_with_notice() {
    let h = harness(PermissionDecision::Granted, false);

    let err = h.dashboard.set_broadcast_enabled(true).unwrap_err();

    assert!(err.is_actionable());
    assert!(!h.dashboard.current_broadcast_enabled());
    assert_eq!(h.dashboard.poll_events(), 1);
    assert_eq!(
        h.dashboard.take_notices()[0].message,
        "Sign in to broadcast your location."
    );
}

#[tokio::test]
async fn test_sign_out_stops_broadcast_and_returns_to_login() {
    let h = harness(PermissionDecision::Granted, true);
    run_cycle(h.dashboard.set_broadcast_enabled(true).unwrap()).await;

    assert_eq!(h.dashboard.sign_out(), Screen::Login);
    assert_eq!(h.navigator.current(), Screen::Login);
    assert!(!h.session.is_authenticated());
    assert!(!h.dashboard.current_broadcast_enabled());
}

#[tokio::test]
async fn test_layer_selection() {
    let h = harness(PermissionDecision::Granted, true);

    let first = h.dashboard.select_layer("temperature_new").unwrap();
    let second = h.dashboard.select_layer("temperature_new").unwrap();
    assert_eq!(first, second);
    assert_eq!(h.dashboard.current_layer(), WeatherLayer::Temperature);
    assert_eq!(h.surface.pages.lock().len(), 2);

    let err = h.dashboard.select_layer("rain").unwrap_err();
    assert!(matches!(err, AppError::Map(MapError::InvalidLayer(_))));
    assert_eq!(h.dashboard.current_layer(), WeatherLayer::Temperature);
    assert_eq!(h.dashboard.available_layers().len(), 5);
}

#[tokio::test]
async fn test_expired_session_cannot_broadcast() {
    let h = harness(PermissionDecision::Granted, false);
    h.session.establish(session_expiring_at(0)).unwrap();

    let err = h.dashboard.set_broadcast_enabled(true).unwrap_err();

    assert!(err.is_actionable());
    assert_eq!(h.dashboard.broadcast_state(), BroadcastState::Disabled);
    assert_eq!(h.dashboard.poll_events(), 1);
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn test_revoked_token_raises_sign_in_notice() {
    let session = Arc::new(SessionContext::new());
    session.establish(session_expiring_at(i64::MAX)).unwrap();
    let map = OverlaySelector::new(
        "owm-key",
        MapView::default(),
        WeatherLayer::default(),
        Arc::new(Screenshots::default()),
    );
    let dashboard = Dashboard::new(
        session,
        Arc::new(Gate(PermissionDecision::Granted)),
        Arc::new(Fix),
        Arc::new(RevokedStore),
        BroadcastOptions::default(),
        Handle::current(),
        map,
        Navigator::new(Screen::Dashboard),
    );

    let outcome = run_cycle(dashboard.set_broadcast_enabled(true).unwrap()).await;

    assert_eq!(outcome, CycleOutcome::Failed(BroadcastError::Unauthenticated));
    assert_eq!(dashboard.broadcast_state(), BroadcastState::Unauthenticated);
    assert!(!dashboard.current_broadcast_enabled());
    assert_eq!(dashboard.poll_events(), 1);
    assert_eq!(
        dashboard.take_notices()[0].message,
        "Sign in to broadcast your location."
    );
}
