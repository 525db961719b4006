//! Application layer - Use cases and business workflows
//!
//! Routes device updates to entity adapters, drives their restore and
//! subscription lifecycle, and turns user intent into device commands.

pub mod entity;
pub mod media;
pub mod messaging;
pub mod router;
pub mod satellite;
pub mod state;

pub use entity::{
    ButtonAdapter, EntityContext, SatelliteEntity, SelectAdapter, SensorAdapter, SwitchAdapter,
};
pub use media::MediaCommands;
pub use messaging::EventBridge;
pub use router::{Dispatcher, RouteOutcome, UpdateRouter};
pub use satellite::{DeviceRegistry, SatelliteEntities, SatelliteManager};
pub use state::InMemoryStateStore;
