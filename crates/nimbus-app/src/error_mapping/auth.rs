use nimbus_auth::AuthError as DomainAuthError;
use nimbus_core::{AppError, AuthError, ConfigError, ReqwestErrorExt};

use super::IntoAppError;

impl IntoAppError for DomainAuthError {
    fn into_app_error(self) -> AppError {
        match self {
            DomainAuthError::MissingField(field) => {
                AppError::Auth(AuthError::Rejected(format!("{} is required", field)))
            }
            DomainAuthError::PasswordMismatch => AppError::Auth(AuthError::PasswordMismatch),
            DomainAuthError::InvalidCredentials => AppError::Auth(AuthError::InvalidCredentials),
            DomainAuthError::EmailTaken => AppError::Auth(AuthError::EmailTaken),
            DomainAuthError::NotConfigured => AppError::Config(ConfigError::MissingSetting(
                "auth.api_key".into(),
            )),
            DomainAuthError::Rejected(s) => AppError::Auth(AuthError::Rejected(s)),
            DomainAuthError::Storage(s) => AppError::Auth(AuthError::StorageError(s)),
            DomainAuthError::Network(e) => AppError::Network(e.into_network_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_keeps_form_message() {
        let err = DomainAuthError::PasswordMismatch.into_app_error();
        assert_eq!(err.user_message(), "Passwords do not match!");
        assert!(err.is_actionable());
    }

    #[test]
    fn missing_key_is_config_error() {
        let err = DomainAuthError::NotConfigured.into_app_error();
        assert!(matches!(err, AppError::Config(ConfigError::MissingSetting(_))));
    }
}
