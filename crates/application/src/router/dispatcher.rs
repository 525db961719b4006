use dashmap::DashMap;
use serde_json::Value;
use std::sync::{Arc, Weak};
use tracing::trace;

use domain::UpdateClass;
use domain::satellite::UpdateHandler;

/// Signal name of one update class on one device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignalKey {
    pub device_id: String,
    pub class: UpdateClass,
}

impl SignalKey {
    pub fn new(device_id: impl Into<String>, class: UpdateClass) -> Self {
        Self {
            device_id: device_id.into(),
            class,
        }
    }
}

impl std::fmt::Display for SignalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "vaca_{}_{}", self.device_id, self.class)
    }
}

/// Signal fan-out for update classes many entities follow.
///
/// Subscribers are weak references, pruned once their entity is dropped.
#[derive(Default)]
pub struct Dispatcher {
    subscriptions: DashMap<SignalKey, Vec<Weak<dyn UpdateHandler>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, key: SignalKey, handler: Weak<dyn UpdateHandler>) {
        trace!(signal = %key, "Signal subscriber connected");
        self.subscriptions.entry(key).or_default().push(handler);
    }

    /// Deliver `data` to every live subscriber of `key`, in subscription order.
    /// Returns the number of subscribers reached.
    pub fn send(&self, key: &SignalKey, data: &Value) -> usize {
        let handlers: Vec<Arc<dyn UpdateHandler>> = match self.subscriptions.get_mut(key) {
            Some(mut subscribers) => {
                subscribers.retain(|handler| handler.strong_count() > 0);
                subscribers.iter().filter_map(Weak::upgrade).collect()
            }
            None => return 0,
        };

        for handler in &handlers {
            handler.handle_update(key.class, data);
        }
        handlers.len()
    }

    /// Drop every subscription of a device.
    pub fn disconnect_device(&self, device_id: &str) {
        self.subscriptions
            .retain(|key, _| key.device_id != device_id);
    }

    pub fn subscriber_count(&self, key: &SignalKey) -> usize {
        self.subscriptions
            .get(key)
            .map(|subscribers| subscribers.iter().filter(|h| h.strong_count() > 0).count())
            .unwrap_or(0)
    }
}
