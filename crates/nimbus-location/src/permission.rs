use std::future::Future;

use crate::types::{Capability, PermissionDecision};

/// Host OS runtime-permission check and request.
pub trait PermissionGate: Send + Sync {
    /// Whether `capability` is already granted
    fn is_granted(&self, capability: Capability) -> bool;

    /// Ask the user for `capability`; resolves once the OS has an answer
    fn request(
        &self,
        capability: Capability,
    ) -> impl Future<Output = PermissionDecision> + Send;
}
