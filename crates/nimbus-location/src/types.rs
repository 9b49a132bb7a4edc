use serde::{Deserialize, Serialize};

/// A single location fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True for finite coordinates inside the WGS-84 ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Store record: `{"latitude": .., "longitude": ..}`
    pub fn to_record(&self) -> serde_json::Value {
        serde_json::json!({
            "latitude": self.latitude,
            "longitude": self.longitude,
        })
    }
}

/// Runtime capabilities the broadcast needs from the host OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    FineLocation,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FineLocation => "fine_location",
        }
    }
}

/// Answer to a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    Granted,
    Denied,
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Errors of one broadcast cycle.
///
/// `Unauthenticated` is returned by the toggle itself; the others are
/// reported on the diagnostic channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BroadcastError {
    #[error("User is not logged in")]
    Unauthenticated,
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location unavailable: {0}")]
    PositionUnavailable(String),
    #[error("Failed to broadcast location: {0}")]
    StoreWriteFailed(String),
}

impl BroadcastError {
    /// Failures that leave the toggle on; the next cycle may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::PositionUnavailable(_) | Self::StoreWriteFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_record_shape() {
        let record = Position::new(12.88, 121.77).to_record();
        assert_eq!(record, serde_json::json!({"latitude": 12.88, "longitude": 121.77}));
    }

    #[test]
    fn test_position_validity() {
        assert!(Position::new(12.88, 121.77).is_valid());
        assert!(Position::new(-90.0, 180.0).is_valid());
        assert!(!Position::new(f64::NAN, 0.0).is_valid());
        assert!(!Position::new(0.0, f64::INFINITY).is_valid());
        assert!(!Position::new(91.0, 0.0).is_valid());
    }

    #[test]
    fn test_recoverable_errors() {
        assert!(BroadcastError::PositionUnavailable("null".into()).is_recoverable());
        assert!(BroadcastError::StoreWriteFailed("500".into()).is_recoverable());
        assert!(!BroadcastError::PermissionDenied.is_recoverable());
        assert!(!BroadcastError::Unauthenticated.is_recoverable());
    }
}
