use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Weak};

use super::listener::{ActionListener, SettingsListener, UpdateHandler};
use super::{Capabilities, SatelliteId, SatelliteInfo};
use crate::command::{Command, CustomAction};
use crate::error::{DomainError, Result};
use crate::event::{UpdateClass, UpdateEvent};

/// In-memory model of one satellite.
///
/// Holds the capability descriptors, the locally cached custom settings and
/// the single-slot listeners. Listener references are weak: registering a new
/// handler for a class replaces the previous one, and a dropped handler simply
/// stops receiving updates.
///
/// Locks are never held while a listener runs, so listeners may call back
/// into the device.
pub struct SatelliteDevice {
    satellite_id: SatelliteId,
    device_id: String,
    info: RwLock<Option<SatelliteInfo>>,
    capabilities: RwLock<Capabilities>,
    custom_settings: RwLock<Map<String, Value>>,
    listeners: RwLock<HashMap<UpdateClass, Weak<dyn UpdateHandler>>>,
    settings_listener: RwLock<Option<Arc<dyn SettingsListener>>>,
    action_listener: RwLock<Option<Arc<dyn ActionListener>>>,
}

impl SatelliteDevice {
    pub fn new(satellite_id: SatelliteId, device_id: impl Into<String>) -> Self {
        Self {
            satellite_id,
            device_id: device_id.into(),
            info: RwLock::new(None),
            capabilities: RwLock::new(Capabilities::default()),
            custom_settings: RwLock::new(Map::new()),
            listeners: RwLock::new(HashMap::new()),
            settings_listener: RwLock::new(None),
            action_listener: RwLock::new(None),
        }
    }

    pub fn with_capabilities(self, capabilities: Capabilities) -> Self {
        *self.capabilities.write() = capabilities;
        self
    }

    pub fn with_info(self, info: SatelliteInfo) -> Self {
        *self.info.write() = Some(info);
        self
    }

    pub fn satellite_id(&self) -> &SatelliteId {
        &self.satellite_id
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn info(&self) -> Option<SatelliteInfo> {
        self.info.read().clone()
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities.read().clone()
    }

    pub fn custom_settings(&self) -> Map<String, Value> {
        self.custom_settings.read().clone()
    }

    pub fn custom_setting(&self, key: &str) -> Option<Value> {
        self.custom_settings.read().get(key).cloned()
    }

    /// Wake-word labels offered by the current info, empty before info arrives.
    pub fn available_wake_words(&self) -> Vec<String> {
        self.info
            .read()
            .as_ref()
            .map(SatelliteInfo::available_wake_words)
            .unwrap_or_default()
    }

    /// Apply the model-side effect of an inbound update.
    ///
    /// Capabilities and info replace the stored descriptors; other classes
    /// carry no model state. A malformed info payload leaves the previous info
    /// in place.
    pub fn apply_update(&self, event: &UpdateEvent) -> Result<()> {
        match event.class {
            UpdateClass::CapabilitiesUpdate => {
                *self.capabilities.write() = Capabilities::from_value(&event.data);
            }
            UpdateClass::Info => {
                let info: SatelliteInfo = serde_json::from_value(event.data.clone())
                    .map_err(|e| DomainError::MalformedPayload(format!("info: {e}")))?;
                *self.info.write() = Some(info);
            }
            _ => {}
        }
        Ok(())
    }

    /// Cache a setting value. No-op when unchanged, otherwise the settings
    /// listener (if any) is told about the new settings.
    pub fn set_custom_setting(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let snapshot = {
            let mut settings = self.custom_settings.write();
            if settings.get(key) == Some(&value) {
                return;
            }
            settings.insert(key.to_string(), value);
            settings.clone()
        };

        let listener = self.settings_listener.read().clone();
        if let Some(listener) = listener {
            listener.settings_changed(&self.satellite_id, &snapshot);
        }
    }

    /// Forward an action to the action listener. Dropped when none is registered.
    pub fn send_custom_action(&self, action: CustomAction, payload: Option<Map<String, Value>>) {
        let listener = self.action_listener.read().clone();
        if let Some(listener) = listener {
            listener.action_requested(&self.satellite_id, &Command::new(action, payload));
        }
    }

    pub fn set_custom_settings_listener(&self, listener: Arc<dyn SettingsListener>) {
        *self.settings_listener.write() = Some(listener);
    }

    pub fn set_custom_action_listener(&self, listener: Arc<dyn ActionListener>) {
        *self.action_listener.write() = Some(listener);
    }

    /// Register the single handler for an update class, replacing any previous one.
    pub fn set_listener(&self, class: UpdateClass, handler: Weak<dyn UpdateHandler>) {
        self.listeners.write().insert(class, handler);
    }

    pub fn set_stt_listener(&self, handler: Weak<dyn UpdateHandler>) {
        self.set_listener(UpdateClass::SttText, handler);
    }

    pub fn set_tts_listener(&self, handler: Weak<dyn UpdateHandler>) {
        self.set_listener(UpdateClass::TtsText, handler);
    }

    pub fn set_info_listener(&self, handler: Weak<dyn UpdateHandler>) {
        self.set_listener(UpdateClass::Info, handler);
    }

    pub fn clear_listeners(&self) {
        self.listeners.write().clear();
        *self.settings_listener.write() = None;
        *self.action_listener.write() = None;
    }

    /// Invoke the registered handler for `class`.
    ///
    /// Returns `false` when no live handler is registered.
    pub fn notify(&self, class: UpdateClass, data: &Value) -> bool {
        let handler = self.listeners.read().get(&class).and_then(Weak::upgrade);
        match handler {
            Some(handler) => {
                handler.handle_update(class, data);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for SatelliteDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SatelliteDevice")
            .field("satellite_id", &self.satellite_id)
            .field("device_id", &self.device_id)
            .field("capabilities", &*self.capabilities.read())
            .field("custom_settings", &*self.custom_settings.read())
            .finish_non_exhaustive()
    }
}
