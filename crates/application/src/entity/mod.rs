//! Entity adapters: each wraps one field of the satellite model.

pub mod button;
pub mod catalog;
pub mod core;
pub mod select;
pub mod sensor;
pub mod switch;

pub use button::ButtonAdapter;
pub use self::core::EntityCore;
pub use select::{OptionSource, SelectAdapter, SettingEncoding};
pub use sensor::SensorAdapter;
pub use switch::{SwitchAdapter, SwitchTarget};

use async_trait::async_trait;
use std::sync::Arc;

use domain::entity::{EntityDescription, EntityState, StateRepository};

use crate::router::Dispatcher;

/// Collaborators an entity needs when it is added.
#[derive(Clone)]
pub struct EntityContext {
    pub repository: Arc<dyn StateRepository>,
    pub dispatcher: Arc<Dispatcher>,
}

/// Common interface of all entity adapters.
#[async_trait]
pub trait SatelliteEntity: Send + Sync {
    fn description(&self) -> &EntityDescription;

    fn entity_id(&self) -> &str;

    fn state(&self) -> EntityState;

    /// Startup: restore the last state, then subscribe to updates.
    async fn added(self: Arc<Self>, ctx: &EntityContext);
}
