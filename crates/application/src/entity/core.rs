use parking_lot::Mutex;
use serde_json::Value;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

use domain::entity::{EntityDescription, EntityState, StateRepository, StateWriter};
use domain::satellite::UpdateHandler;
use domain::{Delivery, SatelliteDevice};

use super::EntityContext;
use crate::router::SignalKey;

#[derive(Debug, Clone)]
struct Displayed {
    value: Value,
    attributes: Option<Value>,
}

/// Restore, subscription and state-writing logic shared by every adapter.
pub struct EntityCore {
    description: EntityDescription,
    entity_id: String,
    device: Arc<SatelliteDevice>,
    writer: Arc<dyn StateWriter>,
    displayed: Mutex<Displayed>,
}

impl EntityCore {
    pub fn new(
        description: EntityDescription,
        device: Arc<SatelliteDevice>,
        writer: Arc<dyn StateWriter>,
    ) -> Self {
        let entity_id = description.entity_id(device.satellite_id());
        let displayed = Displayed {
            value: description.default.clone(),
            attributes: None,
        };
        Self {
            description,
            entity_id,
            device,
            writer,
            displayed: Mutex::new(displayed),
        }
    }

    pub fn description(&self) -> &EntityDescription {
        &self.description
    }

    pub fn key(&self) -> &str {
        &self.description.key
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn device(&self) -> &Arc<SatelliteDevice> {
        &self.device
    }

    pub fn value(&self) -> Value {
        self.displayed.lock().value.clone()
    }

    pub fn state(&self) -> EntityState {
        let displayed = self.displayed.lock().clone();
        EntityState::new(self.entity_id.clone(), displayed.value, displayed.attributes)
            .with_presentation(self.description.icon.clone(), self.description.category)
    }

    /// Display a new value, keeping the current attributes.
    pub fn write(&self, value: Value) {
        self.displayed.lock().value = value;
        self.publish();
    }

    pub fn write_with_attributes(&self, value: Value, attributes: Option<Value>) {
        *self.displayed.lock() = Displayed { value, attributes };
        self.publish();
    }

    /// Push the current state to the state writer.
    pub fn publish(&self) {
        let state = self.state();
        self.writer.write_state(&state);
    }

    /// Last persisted state, if this entity restores and one exists.
    ///
    /// A failing store is logged and treated as "nothing to restore".
    pub async fn last_state(&self, repository: &dyn StateRepository) -> Option<String> {
        if !self.description.restore {
            return None;
        }
        match repository.last_state(&self.entity_id).await {
            Ok(state) => state,
            Err(e) => {
                warn!(entity_id = %self.entity_id, error = %e, "Failed to load last state");
                None
            }
        }
    }

    /// Subscribe `handler` to the description's update class.
    pub fn connect(&self, ctx: &EntityContext, handler: Weak<dyn UpdateHandler>) {
        let Some(subscription) = &self.description.subscription else {
            return;
        };

        debug!(entity_id = %self.entity_id, class = %subscription.class, "Subscribing to updates");
        match subscription.class.delivery() {
            Delivery::DeviceSlot => self.device.set_listener(subscription.class, handler),
            Delivery::Signal => ctx.dispatcher.connect(
                SignalKey::new(self.device.device_id(), subscription.class),
                handler,
            ),
        }
    }
}
