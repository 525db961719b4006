//! Domain layer - Pure satellite model with no I/O
//!
//! This crate contains:
//! - The satellite device model (capabilities, info, custom settings, listener slots)
//! - Inbound update events and outbound commands
//! - Total value coercions
//! - Entity descriptions and states
//! - Repository and listener interfaces (traits)
//!
//! Principles:
//! - No dependencies on infrastructure
//! - Nothing here fails on malformed device data; it degrades to sentinels
//! - Testable in isolation

pub mod command;
pub mod entity;
pub mod error;
pub mod event;
pub mod satellite;
pub mod value;

// Re-export commonly used types
pub use command::{Command, CustomAction};
pub use entity::{EntityDescription, EntityState, StateRepository, StateWriter};
pub use error::DomainError;
pub use event::{Delivery, UpdateClass, UpdateEvent};
pub use satellite::{Capabilities, SatelliteDevice, SatelliteId, SatelliteInfo};
pub use value::Coercion;
