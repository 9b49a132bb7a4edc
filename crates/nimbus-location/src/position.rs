use std::future::Future;

use crate::types::{LocationError, Position};

/// Platform location provider.
///
/// Each call yields at most one best-known fix; `Ok(None)` means the
/// provider had nothing to report. Timeouts are the provider's own.
pub trait PositionSource: Send + Sync {
    fn get_once(&self) -> impl Future<Output = Result<Option<Position>, LocationError>> + Send;
}
