//! Screens and wiring for Nimbus.
//!
//! The UI layer calls into `AuthFlow` and `Dashboard`; `AppServices`
//! builds them from the configuration.

pub mod app_services;
pub mod auth_flow;
pub mod dashboard;
pub mod error_mapping;
pub mod navigator;

pub use app_services::{AppServices, LiveDashboard};
pub use auth_flow::AuthFlow;
pub use dashboard::{Dashboard, Notice};
pub use error_mapping::IntoAppError;
pub use navigator::Navigator;
