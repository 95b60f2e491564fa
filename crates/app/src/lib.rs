//! # homesim-app
//!
//! Application layer — message protocol, use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `Transport` — publish outbound messages, subscribe to topic patterns
//!   - `DeviceSource` — fetch device creation requests at startup
//! - Define the **message protocol**: topic layout, `{"contents": …}`
//!   envelope, sender identity
//! - Route inbound messages to the registry (`Router`), with echo suppression
//! - Run the periodic **simulation driver** and the inbound **dispatcher**,
//!   both serialised on one registry lock
//!
//! ## Dependency rule
//! Depends on `homesim-domain` only (plus `tokio` for locks, channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod protocol;
pub mod router;
pub mod services;
