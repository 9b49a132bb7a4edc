use std::fmt;
use std::str::FromStr;

use nimbus_core::MapError;
use serde::{Deserialize, Serialize};

/// OpenWeather tile overlays, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WeatherLayer {
    #[default]
    #[serde(rename = "precipitation_new")]
    Precipitation,
    #[serde(rename = "temperature_new")]
    Temperature,
    #[serde(rename = "clouds_new")]
    Clouds,
    #[serde(rename = "wind_new")]
    Wind,
    #[serde(rename = "pressure_new")]
    Pressure,
}

const ALL_LAYERS: [WeatherLayer; 5] = [
    WeatherLayer::Precipitation,
    WeatherLayer::Temperature,
    WeatherLayer::Clouds,
    WeatherLayer::Wind,
    WeatherLayer::Pressure,
];

impl WeatherLayer {
    /// Every selectable layer, in menu order
    pub fn all() -> &'static [WeatherLayer] {
        &ALL_LAYERS
    }

    /// Tile-service layer id, e.g. `precipitation_new`
    pub fn id(&self) -> &'static str {
        match self {
            Self::Precipitation => "precipitation_new",
            Self::Temperature => "temperature_new",
            Self::Clouds => "clouds_new",
            Self::Wind => "wind_new",
            Self::Pressure => "pressure_new",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Precipitation => "Precipitation",
            Self::Temperature => "Temperature",
            Self::Clouds => "Clouds",
            Self::Wind => "Wind",
            Self::Pressure => "Pressure",
        }
    }

    /// Look up a layer by its id. Anything outside the fixed set is
    /// `InvalidLayer`.
    pub fn parse(id: &str) -> Result<Self, MapError> {
        ALL_LAYERS
            .iter()
            .copied()
            .find(|layer| layer.id() == id)
            .ok_or_else(|| MapError::InvalidLayer(id.to_string()))
    }
}

impl FromStr for WeatherLayer {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for WeatherLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_match_config_list() {
        let ids: Vec<&str> = WeatherLayer::all().iter().map(|l| l.id()).collect();
        assert_eq!(ids, nimbus_core::WEATHER_LAYER_IDS);
    }

    #[test]
    fn test_parse_round_trips_ids() {
        for layer in WeatherLayer::all() {
            assert_eq!(WeatherLayer::parse(layer.id()).unwrap(), *layer);
        }
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(matches!(
            WeatherLayer::parse("snow_new"),
            Err(MapError::InvalidLayer(id)) if id == "snow_new"
        ));
        assert!(WeatherLayer::parse("").is_err());
        assert!("Temperature_new".parse::<WeatherLayer>().is_err());
    }

    #[test]
    fn test_default_is_precipitation() {
        assert_eq!(WeatherLayer::default(), WeatherLayer::Precipitation);
    }

    #[test]
    fn test_serde_uses_ids() {
        let json = serde_json::to_string(&WeatherLayer::Wind).unwrap();
        assert_eq!(json, "\"wind_new\"");
        let layer: WeatherLayer = serde_json::from_str("\"clouds_new\"").unwrap();
        assert_eq!(layer, WeatherLayer::Clouds);
    }
}
