//! Location broadcast for Nimbus
//!
//! Publishes the signed-in user's position to the shared store when the
//! dashboard toggle is switched on. Platform permission and location
//! services are reached through the `PermissionGate` and `PositionSource`
//! traits.

pub mod broadcast;
pub mod permission;
pub mod position;
pub mod types;

pub use broadcast::{
    BroadcastController, BroadcastEvent, BroadcastOptions, BroadcastState, CycleHandle,
    CycleOutcome, Toggle,
};
pub use permission::PermissionGate;
pub use position::PositionSource;
pub use types::*;
