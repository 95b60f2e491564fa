//! Application services — use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.
//! The driver and the dispatcher share one [`SharedRegistry`]; holding its
//! lock for a whole tick pass or a whole message serialises the two.

pub mod dispatcher;
pub mod driver;
pub mod loader;

use std::sync::Arc;

use tokio::sync::Mutex;

use homesim_domain::registry::Registry;

/// The registry behind the single lock both concurrent paths take.
pub type SharedRegistry = Arc<Mutex<Registry>>;

#[must_use]
pub fn share(registry: Registry) -> SharedRegistry {
    Arc::new(Mutex::new(registry))
}
