//! Bootstrap port — where the initial device population comes from.

use std::future::Future;

use serde_json::Value;

use homesim_domain::error::SimError;

/// Supplies raw device creation requests at startup.
///
/// Retrying a failed fetch is the implementation's responsibility; the
/// caller treats an error as final.
pub trait DeviceSource: Send + Sync {
    fn fetch_devices(&self) -> impl Future<Output = Result<Vec<Value>, SimError>> + Send;
}
