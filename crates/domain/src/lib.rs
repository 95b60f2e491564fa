//! # homesim-domain
//!
//! Pure domain model for the homesim smart-home simulator.
//!
//! ## Responsibilities
//! - Foundational types: error taxonomy, bounded values, time-of-day
//! - Define the **device family** (water heater, light, air conditioner,
//!   door lock, curtain), each owning validated attributes
//! - Define the **drift engine** that mutates devices on every tick
//! - Define the **registry**, the authoritative store of live devices
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod bounds;
pub mod choice;
pub mod color;
pub mod device;
pub mod device_type;
pub mod drift;
pub mod params;
pub mod registry;
pub mod spec;
pub mod status;
