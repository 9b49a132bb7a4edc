use std::sync::Arc;

use nimbus_app::AppServices;
use nimbus_auth::{IdentityId, Session, SessionStorage};
use nimbus_core::{AppError, Config, ConfigError, Screen};
use nimbus_location::{
    BroadcastState, Capability, CycleOutcome, LocationError, PermissionDecision, PermissionGate,
    Position, PositionSource, Toggle,
};
use nimbus_map::{FileSurface, WeatherLayer};
use nimbus_store::StoreBackend;
use serde_json::json;

struct AllowAll;

impl PermissionGate for AllowAll {
    fn is_granted(&self, _capability: Capability) -> bool {
        true
    }

    async fn request(&self, _capability: Capability) -> PermissionDecision {
        PermissionDecision::Granted
    }
}

struct Manila;

impl PositionSource for Manila {
    async fn get_once(&self) -> Result<Option<Position>, LocationError> {
        Ok(Some(Position::new(14.6, 120.98)))
    }
}

fn config(dir: &tempfile::TempDir) -> Config {
    let mut config = Config {
        config_dir: dir.path().to_path_buf(),
        ..Config::default()
    };
    config.auth.api_key = None;
    config.map.api_key = Some("owm-key".into());
    config.map.default_layer = "clouds_new".into();
    config
}

#[test]
fn test_starts_on_login_without_session() {
    let dir = tempfile::tempdir().unwrap();
    let services = AppServices::new(config(&dir)).unwrap();

    assert_eq!(services.screen(), Screen::Login);
    assert!(!services.session().is_authenticated());
    services.shutdown();
}

#[test]
fn test_restored_session_starts_on_dashboard() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&dir);
    SessionStorage::new(config.session_path())
        .store(&Session {
            identity: IdentityId::new("uid-1"),
            email: "ana@example.com".into(),
            id_token: "token".into(),
            refresh_token: None,
            expires_at: far_future(),
        })
        .unwrap();

    let services = AppServices::new(config).unwrap();
    assert_eq!(services.screen(), Screen::Dashboard);
    services.shutdown();
}

#[test]
fn test_auth_flow_needs_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let services = AppServices::new(config(&dir)).unwrap();

    assert!(matches!(
        services.auth_flow(),
        Err(AppError::Config(ConfigError::MissingSetting(_)))
    ));
    services.shutdown();
}

#[test]
fn test_overlay_selector_uses_configured_layer() {
    let dir = tempfile::tempdir().unwrap();
    let services = AppServices::new(config(&dir)).unwrap();
    let surface = Arc::new(FileSurface::new(dir.path().join("map.html")));

    let selector = services.overlay_selector(surface).unwrap();
    assert_eq!(selector.current_layer(), WeatherLayer::Clouds);

    selector.render();
    let page = std::fs::read_to_string(dir.path().join("map.html")).unwrap();
    assert!(page.contains("clouds_new/{z}/{x}/{y}?appid=owm-key"));
    services.shutdown();
}

#[test]
fn test_overlay_selector_without_map_key_renders_keyless_page() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&dir);
    config.map.api_key = Some("YOUR_OPENWEATHER_KEY".into());
    let services = AppServices::new(config).unwrap();
    let surface = Arc::new(FileSurface::new(dir.path().join("map.html")));

    let selector = services.overlay_selector(surface).unwrap();
    selector.render();

    let page = std::fs::read_to_string(dir.path().join("map.html")).unwrap();
    assert!(page.contains("clouds_new/{z}/{x}/{y}?appid=\""));
    assert!(!page.contains("YOUR_OPENWEATHER_KEY"));
    services.shutdown();
}

#[test]
fn test_dashboard_does_not_need_map_key() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&dir);
    config.map.api_key = None;
    let services = AppServices::new(config).unwrap();
    let surface = Arc::new(FileSurface::new(dir.path().join("map.html")));

    let dashboard = services
        .dashboard(Arc::new(AllowAll), Arc::new(Manila), surface)
        .unwrap();
    assert_eq!(dashboard.broadcast_state(), BroadcastState::Disabled);
    assert_eq!(dashboard.current_layer(), WeatherLayer::Clouds);

    drop(dashboard);
    services.shutdown();
}

#[test]
fn test_offline_mode_broadcasts_into_memory() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&dir);
    config.store.offline = true;
    SessionStorage::new(config.session_path())
        .store(&Session {
            identity: IdentityId::new("uid-1"),
            email: "ana@example.com".into(),
            id_token: "token".into(),
            refresh_token: None,
            expires_at: far_future(),
        })
        .unwrap();

    let services = AppServices::new(config).unwrap();
    assert!(services.store().is_offline());

    let surface = Arc::new(FileSurface::new(dir.path().join("map.html")));
    let dashboard = services
        .dashboard(Arc::new(AllowAll), Arc::new(Manila), surface)
        .unwrap();

    let handle = match dashboard.set_broadcast_enabled(true).unwrap() {
        Toggle::Started(handle) => handle,
        other => panic!("expected a cycle, got {:?}", other),
    };
    let outcome = services.runtime().block_on(handle.outcome());
    assert_eq!(outcome, CycleOutcome::Broadcast(Position::new(14.6, 120.98)));

    let store = services.store();
    let StoreBackend::Memory(memory) = &*store else {
        panic!("offline mode should use the memory store");
    };
    assert_eq!(
        memory.get("user_locations/uid-1"),
        Some(json!({"latitude": 14.6, "longitude": 120.98}))
    );

    drop(dashboard);
    services.shutdown();
}

/// Year 2100, far enough out for any test run.
fn far_future() -> i64 {
    4_102_444_800
}
