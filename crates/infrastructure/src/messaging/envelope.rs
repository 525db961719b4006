//! Wire envelopes exchanged with the satellites.
//!
//! Inbound: `{"type": <update class>, "data": {...}}` on `{prefix}/{device_id}/event`.
//! Outbound: `{"type": "custom-event", "data": {"event_type": <name>, ...payload}}`.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use domain::{Command, UpdateClass, UpdateEvent};

pub const CUSTOM_EVENT: &str = "custom-event";
pub const SETTINGS_EVENT: &str = "settings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

/// Decode an inbound event envelope.
///
/// Errors for malformed JSON and for update classes this agent does not model.
pub fn decode_update(device_id: &str, payload: &[u8]) -> Result<UpdateEvent> {
    let envelope: Envelope = serde_json::from_slice(payload)?;
    let class = UpdateClass::parse(&envelope.kind)
        .ok_or_else(|| anyhow!("Unsupported event type '{}'", envelope.kind))?;
    Ok(UpdateEvent::new(device_id, class, envelope.data))
}

/// Build an outbound custom event. Payload keys are flattened next to `event_type`.
pub fn custom_event(event_type: &str, payload: Option<&Map<String, Value>>) -> Value {
    let mut data = Map::new();
    data.insert("event_type".to_string(), json!(event_type));
    if let Some(payload) = payload {
        for (key, value) in payload {
            data.insert(key.clone(), value.clone());
        }
    }
    json!({ "type": CUSTOM_EVENT, "data": data })
}

pub fn command_event(command: &Command) -> Value {
    custom_event(command.action.as_str(), command.payload.as_ref())
}

pub fn settings_event(settings: &Map<String, Value>) -> Value {
    let mut payload = Map::new();
    payload.insert("settings".to_string(), Value::Object(settings.clone()));
    custom_event(SETTINGS_EVENT, Some(&payload))
}

/// Topic layout under a common prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    prefix: String,
}

impl Topics {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Wildcard subscription for every device's events.
    pub fn event_filter(&self) -> String {
        format!("{}/+/event", self.prefix)
    }

    /// Device id of an inbound event topic, `None` for anything else.
    pub fn device_of_event<'a>(&self, topic: &'a str) -> Option<&'a str> {
        let device_id = topic
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix('/')?
            .strip_suffix("/event")?;
        (!device_id.is_empty() && !device_id.contains('/')).then_some(device_id)
    }

    pub fn action(&self, satellite_id: &str) -> String {
        format!("{}/{}/action", self.prefix, satellite_id)
    }

    pub fn settings(&self, satellite_id: &str) -> String {
        format!("{}/{}/settings", self.prefix, satellite_id)
    }

    pub fn state(&self, entity_id: &str) -> String {
        format!("{}/state/{}", self.prefix, entity_id)
    }

    /// Retained ONLINE / OFFLINE presence of the agent itself.
    pub fn agent_status(&self, agent_id: &str) -> String {
        format!("{}/agent/{}/status", self.prefix, agent_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::CustomAction;

    #[test]
    fn test_decode_status_update() {
        let payload = br#"{"type": "status_update", "data": {"sensors": {"light": "3"}}}"#;
        let event = decode_update("dev-1", payload).unwrap();
        assert_eq!(event.class, UpdateClass::StatusUpdate);
        assert_eq!(event.device_id, "dev-1");
        assert_eq!(event.data["sensors"]["light"], json!("3"));
    }

    #[test]
    fn test_decode_rejects_unknown_type_and_garbage() {
        assert!(decode_update("dev-1", br#"{"type": "pipeline-ended", "data": {}}"#).is_err());
        assert!(decode_update("dev-1", b"not json").is_err());
    }

    #[test]
    fn test_command_event_flattens_payload() {
        let mut payload = Map::new();
        payload.insert("activate".into(), json!(true));
        payload.insert("url".into(), json!(""));
        let event = command_event(&Command::new(CustomAction::Alarm, Some(payload)));

        assert_eq!(
            event,
            json!({"type": "custom-event", "data": {"event_type": "alarm", "activate": true, "url": ""}})
        );
        assert_eq!(
            command_event(&Command::bare(CustomAction::ScreenWake)),
            json!({"type": "custom-event", "data": {"event_type": "screen-wake"}})
        );
    }

    #[test]
    fn test_settings_event() {
        let settings = json!({"mute": true, "screen_timeout": 60});
        let event = settings_event(settings.as_object().unwrap());
        assert_eq!(event["data"]["event_type"], json!("settings"));
        assert_eq!(event["data"]["settings"], settings);
    }

    #[test]
    fn test_topics() {
        let topics = Topics::new("vaca/");
        assert_eq!(topics.event_filter(), "vaca/+/event");
        assert_eq!(topics.device_of_event("vaca/dev-1/event"), Some("dev-1"));
        assert_eq!(topics.device_of_event("vaca/dev-1/action"), None);
        assert_eq!(topics.device_of_event("other/dev-1/event"), None);
        assert_eq!(topics.state("switch.vaca_1_mute"), "vaca/state/switch.vaca_1_mute");
    }
}
