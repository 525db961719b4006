use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category tag of an inbound device update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateClass {
    /// Sensor readings (`{"sensors": {...}}`)
    StatusUpdate,
    /// Device-reported setting states (`{"settings": {...}}`)
    SettingsUpdate,
    /// Capability flags, replaces the device's capabilities
    CapabilitiesUpdate,
    /// Nested conversation result (`{"intent_output": {...}}`)
    IntentOutput,
    /// Wake-word model catalog
    Info,
    /// Speech-to-text transcript (`{"text": "..."}`)
    SttText,
    /// Text-to-speech response (`{"text": "..."}`)
    TtsText,
}

/// How an update class reaches its consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Single listener slot on the device model, last registration wins
    DeviceSlot,
    /// Signal subscription, every subscribed entity receives the event
    Signal,
}

impl UpdateClass {
    pub const ALL: [UpdateClass; 7] = [
        Self::StatusUpdate,
        Self::SettingsUpdate,
        Self::CapabilitiesUpdate,
        Self::IntentOutput,
        Self::Info,
        Self::SttText,
        Self::TtsText,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StatusUpdate => "status_update",
            Self::SettingsUpdate => "settings_update",
            Self::CapabilitiesUpdate => "capabilities_update",
            Self::IntentOutput => "intent_output",
            Self::Info => "info",
            Self::SttText => "stt_text",
            Self::TtsText => "tts_text",
        }
    }

    /// Parse a wire tag; unknown tags yield `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.as_str() == tag)
    }

    pub fn delivery(&self) -> Delivery {
        match self {
            Self::Info | Self::SttText | Self::TtsText => Delivery::DeviceSlot,
            Self::StatusUpdate
            | Self::SettingsUpdate
            | Self::CapabilitiesUpdate
            | Self::IntentOutput => Delivery::Signal,
        }
    }
}

impl std::fmt::Display for UpdateClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound update addressed to one device. Routed, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub device_id: String,
    pub class: UpdateClass,
    pub data: Value,
}

impl UpdateEvent {
    pub fn new(device_id: impl Into<String>, class: UpdateClass, data: Value) -> Self {
        Self {
            device_id: device_id.into(),
            class,
            data,
        }
    }

    pub fn status(device_id: impl Into<String>, data: Value) -> Self {
        Self::new(device_id, UpdateClass::StatusUpdate, data)
    }

    pub fn settings(device_id: impl Into<String>, data: Value) -> Self {
        Self::new(device_id, UpdateClass::SettingsUpdate, data)
    }

    pub fn capabilities(device_id: impl Into<String>, data: Value) -> Self {
        Self::new(device_id, UpdateClass::CapabilitiesUpdate, data)
    }

    pub fn info(device_id: impl Into<String>, data: Value) -> Self {
        Self::new(device_id, UpdateClass::Info, data)
    }

    pub fn stt(device_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(
            device_id,
            UpdateClass::SttText,
            serde_json::json!({ "text": text.into() }),
        )
    }

    pub fn tts(device_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(
            device_id,
            UpdateClass::TtsText,
            serde_json::json!({ "text": text.into() }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_round_trips_every_tag() {
        for class in UpdateClass::ALL {
            assert_eq!(UpdateClass::parse(class.as_str()), Some(class));
        }
        assert_eq!(UpdateClass::parse("timers"), None);
    }

    #[test]
    fn test_delivery_modes() {
        assert_eq!(UpdateClass::Info.delivery(), Delivery::DeviceSlot);
        assert_eq!(UpdateClass::SttText.delivery(), Delivery::DeviceSlot);
        assert_eq!(UpdateClass::StatusUpdate.delivery(), Delivery::Signal);
        assert_eq!(UpdateClass::IntentOutput.delivery(), Delivery::Signal);
    }

    #[test]
    fn test_event_serialization_uses_wire_tags() {
        let event = UpdateEvent::status("dev-1", json!({"sensors": {"light": "10"}}));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["class"], json!("status_update"));
        assert_eq!(value["device_id"], json!("dev-1"));
    }

    #[test]
    fn test_text_constructors() {
        let event = UpdateEvent::stt("dev-1", "what time is it");
        assert_eq!(event.class, UpdateClass::SttText);
        assert_eq!(event.data, json!({"text": "what time is it"}));
    }
}
