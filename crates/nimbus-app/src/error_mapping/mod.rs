//! Maps domain errors to nimbus_core::AppError for consistent user-facing messages.
//! Each domain has its own module to keep mappings small and readable.

use nimbus_core::AppError;

mod auth;
mod broadcast;
mod store;

/// Conversion into the application-wide error type.
///
/// A trait rather than `From` because both sides live in other crates.
pub trait IntoAppError {
    fn into_app_error(self) -> AppError;
}
