use std::sync::Arc;

use nimbus_core::MapError;
use parking_lot::Mutex;

use crate::document::{generate, MapDocument, MapView};
use crate::layer::WeatherLayer;
use crate::surface::{RenderSurface, SurfaceEvent};

const LOG_TARGET: &str = "map";

#[derive(Debug)]
struct SelectorState {
    current: WeatherLayer,
    regenerations: u64,
    last_error: Option<MapError>,
}

/// Holds the selected weather overlay and regenerates the map page on
/// every selection.
///
/// Selections from several threads are applied one at a time, so the
/// surface always ends up showing `current_layer()`.
pub struct OverlaySelector<R> {
    credential: String,
    view: MapView,
    surface: Arc<R>,
    state: Mutex<SelectorState>,
    /// Held from the state update until the surface has the page
    display: Mutex<()>,
}

impl<R: RenderSurface> OverlaySelector<R> {
    pub fn new(
        credential: impl Into<String>,
        view: MapView,
        initial: WeatherLayer,
        surface: Arc<R>,
    ) -> Self {
        Self {
            credential: credential.into(),
            view,
            surface,
            state: Mutex::new(SelectorState {
                current: initial,
                regenerations: 0,
                last_error: None,
            }),
            display: Mutex::new(()),
        }
    }

    pub fn current_layer(&self) -> WeatherLayer {
        self.state.lock().current
    }

    pub fn available_layers(&self) -> &'static [WeatherLayer] {
        WeatherLayer::all()
    }

    /// Number of pages generated so far
    pub fn regenerations(&self) -> u64 {
        self.state.lock().regenerations
    }

    /// Most recent error reported by the surface, cleared on successful load
    pub fn last_error(&self) -> Option<MapError> {
        self.state.lock().last_error.clone()
    }

    /// Render the current selection, e.g. when the map first appears
    pub fn render(&self) -> MapDocument {
        let layer = self.current_layer();
        self.select(layer)
    }

    /// Switch to `layer` and regenerate the page.
    ///
    /// Re-selecting the current layer still regenerates.
    pub fn select(&self, layer: WeatherLayer) -> MapDocument {
        let _display = self.display.lock();
        let document = {
            let mut state = self.state.lock();
            state.current = layer;
            state.regenerations += 1;
            generate(&self.credential, layer, &self.view)
        };

        tracing::debug!(target: LOG_TARGET, "Loading map with selected layer: {}", layer);
        if let Some(event) = self.surface.display(&document) {
            self.on_surface_event(event);
        }
        document
    }

    /// Select by layer id. Unknown ids leave the selection untouched.
    pub fn select_id(&self, id: &str) -> Result<MapDocument, MapError> {
        let layer = WeatherLayer::parse(id).inspect_err(|e| {
            tracing::error!(target: LOG_TARGET, "Rejected layer selection: {}", e);
        })?;
        Ok(self.select(layer))
    }

    /// Record a load result from the surface. Nothing is retried.
    pub fn on_surface_event(&self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Loaded => {
                tracing::debug!(target: LOG_TARGET, "Map page loaded successfully.");
                self.state.lock().last_error = None;
            }
            SurfaceEvent::Error {
                code,
                description,
                url,
            } => {
                tracing::error!(
                    target: LOG_TARGET,
                    "Map failed to load (code {}): {} [{}]",
                    code,
                    description,
                    url.as_deref().unwrap_or("-")
                );
                self.state.lock().last_error = Some(MapError::RenderSurface { code, description });
            }
        }
    }
}
