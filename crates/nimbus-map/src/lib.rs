//! Weather map for Nimbus
//!
//! Generates a Leaflet page with an OpenWeather tile overlay and tracks
//! which overlay the user picked.

pub mod document;
pub mod layer;
pub mod selector;
pub mod surface;

pub use document::{generate, weather_tile_url, MapDocument, MapView};
pub use layer::WeatherLayer;
pub use selector::OverlaySelector;
pub use surface::{FileSurface, RenderSurface, SurfaceEvent};
