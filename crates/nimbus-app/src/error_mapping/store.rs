use nimbus_core::{AppError, AuthError, NetworkError, ReqwestErrorExt};
use nimbus_store::StoreError;

use super::IntoAppError;

impl IntoAppError for StoreError {
    fn into_app_error(self) -> AppError {
        match self {
            StoreError::InvalidPath(p) => AppError::Service(format!("Invalid store path: {}", p)),
            StoreError::Unauthorized => AppError::Auth(AuthError::SessionExpired),
            StoreError::Status { status, message } => {
                AppError::Network(NetworkError::ServerError { status, message })
            }
            StoreError::Serialization(e) => {
                AppError::Network(NetworkError::InvalidResponse(e.to_string()))
            }
            StoreError::Network(e) => AppError::Network(e.into_network_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_asks_for_sign_in() {
        let err = StoreError::Unauthorized.into_app_error();
        assert!(matches!(err, AppError::Auth(AuthError::SessionExpired)));
    }

    #[test]
    fn status_keeps_code() {
        let err = StoreError::Status {
            status: 503,
            message: "down".into(),
        }
        .into_app_error();
        assert!(matches!(
            err,
            AppError::Network(NetworkError::ServerError { status: 503, .. })
        ));
    }
}
