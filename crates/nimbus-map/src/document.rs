//! Map page generation.
//!
//! The page is a self-contained Leaflet document: an OpenStreetMap base layer
//! with one OpenWeather overlay on top. Generation is pure; tiles are fetched
//! later by whatever renders the page.

use nimbus_core::MapConfig;

use crate::layer::WeatherLayer;

const BASE_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const WEATHER_TILE_ROOT: &str = "https://maps.openweathermap.org/maps/2.0/weather";

/// Fixed viewport the map opens on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center_latitude: 12.8797,
            center_longitude: 121.7740,
            zoom: 6,
        }
    }
}

impl From<&MapConfig> for MapView {
    fn from(config: &MapConfig) -> Self {
        Self {
            center_latitude: config.center_latitude,
            center_longitude: config.center_longitude,
            zoom: config.zoom,
        }
    }
}

/// A generated map page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDocument {
    layer: WeatherLayer,
    html: String,
}

impl MapDocument {
    pub fn layer(&self) -> WeatherLayer {
        self.layer
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Tile URL template for `layer`, keyed with `credential`.
///
/// `{z}/{x}/{y}` are left for the map library to fill in.
pub fn weather_tile_url(credential: &str, layer: WeatherLayer) -> String {
    let appid: String = url::form_urlencoded::byte_serialize(credential.as_bytes()).collect();
    format!("{}/{}/{{z}}/{{x}}/{{y}}?appid={}", WEATHER_TILE_ROOT, layer.id(), appid)
}

/// Build the map page for `layer`.
///
/// The same inputs always give byte-identical output.
pub fn generate(credential: &str, layer: WeatherLayer, view: &MapView) -> MapDocument {
    let weather_url = script_string(&weather_tile_url(credential, layer));
    let base_url = script_string(BASE_TILE_URL);
    let layer_id = script_string(layer.id());

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <style>
        html, body {{ margin: 0; padding: 0; height: 100%; }}
        #map {{ height: 100%; width: 100%; }}
    </style>
    <link rel="stylesheet" href="https://unpkg.com/leaflet/dist/leaflet.css" />
    <script src="https://unpkg.com/leaflet/dist/leaflet.js"></script>
</head>
<body>
    <div id="map"></div>
    <script>
        try {{
            const map = L.map('map').setView([{lat}, {lon}], {zoom});
            L.tileLayer({base_url}, {{
                attribution: '&copy; OpenStreetMap contributors'
            }}).addTo(map);
            L.tileLayer({weather_url}, {{
                attribution: 'Weather data &copy; OpenWeather'
            }}).addTo(map);
            console.log("Weather layer added: " + {layer_id});
        }} catch (error) {{
            console.error("Error in map script:", error);
        }}
    </script>
</body>
</html>
"#,
        lat = view.center_latitude,
        lon = view.center_longitude,
        zoom = view.zoom,
        base_url = base_url,
        weather_url = weather_url,
        layer_id = layer_id,
    );

    MapDocument { layer, html }
}

/// Quote `value` as a JavaScript string literal that is also safe inside a
/// `<script>` element.
fn script_string(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    let mut out = String::with_capacity(quoted.len());
    for c in quoted.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out
}
