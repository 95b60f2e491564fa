//! Device loader — bulk-creates the initial population from a
//! [`DeviceSource`].

use homesim_domain::error::SimError;
use homesim_domain::registry::Registry;

use crate::ports::DeviceSource;

/// Counts from one bootstrap import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub created: usize,
    pub rejected: usize,
}

/// Application service that fills a registry at startup.
pub struct DeviceLoader<S> {
    source: S,
}

impl<S: DeviceSource> DeviceLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch every creation request and create the devices one by one.
    ///
    /// A rejected request is logged and skipped; the rest still load.
    ///
    /// # Errors
    ///
    /// Returns the source's error when the fetch itself fails.
    #[tracing::instrument(skip_all)]
    pub async fn load_into(&self, registry: &mut Registry) -> Result<LoadReport, SimError> {
        let requests = self.source.fetch_devices().await?;
        let mut report = LoadReport::default();
        for request in &requests {
            match registry.create_from_value(request) {
                Ok(_) => report.created += 1,
                Err(err) => {
                    tracing::error!(error = %err, "failed to create device");
                    report.rejected += 1;
                }
            }
        }
        tracing::info!(created = report.created, rejected = report.rejected, "devices loaded");
        Ok(report)
    }
}
