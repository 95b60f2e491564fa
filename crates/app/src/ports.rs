//! Ports — the two seams between the simulator core and the outside world.
//!
//! Adapters implement these traits; services depend on them through
//! generic parameters, so tests can swap in in-memory implementations.

pub mod bootstrap;
pub mod transport;

pub use bootstrap::DeviceSource;
pub use transport::Transport;
