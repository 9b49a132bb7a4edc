use nimbus_core::{AppError, BroadcastError};
use nimbus_location::BroadcastError as DomainBroadcastError;

use super::IntoAppError;

impl IntoAppError for DomainBroadcastError {
    fn into_app_error(self) -> AppError {
        AppError::Broadcast(match self {
            DomainBroadcastError::Unauthenticated => BroadcastError::Unauthenticated,
            DomainBroadcastError::PermissionDenied => BroadcastError::PermissionDenied,
            DomainBroadcastError::PositionUnavailable(s) => BroadcastError::PositionUnavailable(s),
            DomainBroadcastError::StoreWriteFailed(s) => BroadcastError::StoreWriteFailed(s),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_gate_errors_are_actionable() {
        assert!(DomainBroadcastError::PermissionDenied.into_app_error().is_actionable());
        assert!(DomainBroadcastError::Unauthenticated.into_app_error().is_actionable());
        assert!(!DomainBroadcastError::StoreWriteFailed("503".into())
            .into_app_error()
            .is_actionable());
    }
}
