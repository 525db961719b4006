mod dispatcher;

pub use dispatcher::{Dispatcher, SignalKey};

use std::sync::Arc;
use tracing::{debug, warn};

use domain::{Delivery, UpdateEvent};

use crate::satellite::DeviceRegistry;

/// Routes inbound updates to the entities following them.
///
/// Events are handled synchronously and in the order `route` is called.
/// Unknown devices and classes nobody listens to are dropped quietly.
#[derive(Clone)]
pub struct UpdateRouter {
    registry: Arc<DeviceRegistry>,
    dispatcher: Arc<Dispatcher>,
}

/// What happened to a routed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Number of handlers the event reached (may be zero)
    Delivered(usize),
    /// No device is registered under the event's device id
    UnknownDevice,
    /// The payload could not be applied to the device model
    Rejected,
}

impl UpdateRouter {
    pub fn new(registry: Arc<DeviceRegistry>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            registry,
            dispatcher,
        }
    }

    pub fn route(&self, event: &UpdateEvent) -> RouteOutcome {
        let Some(device) = self.registry.find_by_device_id(&event.device_id) else {
            debug!(device_id = %event.device_id, class = %event.class, "Dropping update for unknown device");
            return RouteOutcome::UnknownDevice;
        };

        if let Err(e) = device.apply_update(event) {
            warn!(
                satellite_id = %device.satellite_id(),
                class = %event.class,
                error = %e,
                "Ignoring malformed update"
            );
            return RouteOutcome::Rejected;
        }

        let reached = match event.class.delivery() {
            Delivery::DeviceSlot => usize::from(device.notify(event.class, &event.data)),
            Delivery::Signal => self
                .dispatcher
                .send(&SignalKey::new(event.device_id.clone(), event.class), &event.data),
        };

        if reached == 0 {
            debug!(
                satellite_id = %device.satellite_id(),
                class = %event.class,
                "No listener for update"
            );
        }
        RouteOutcome::Delivered(reached)
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}
