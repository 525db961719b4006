use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::EntityCategory;

/// Displayed state of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    /// `null` means unknown / unavailable
    pub value: Value,
    #[serde(default)]
    pub attributes: Option<Value>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<EntityCategory>,
}

impl EntityState {
    pub fn new(entity_id: impl Into<String>, value: Value, attributes: Option<Value>) -> Self {
        Self {
            entity_id: entity_id.into(),
            value,
            attributes,
            updated_at: Utc::now(),
            icon: None,
            category: None,
        }
    }

    /// Attach the display hints of the entity's description.
    pub fn with_presentation(
        mut self,
        icon: Option<String>,
        category: Option<EntityCategory>,
    ) -> Self {
        self.icon = icon;
        self.category = category;
        self
    }

    /// Scalar string form kept by the restore store.
    pub fn persisted_value(&self) -> String {
        match &self.value {
            Value::Null => "unknown".to_string(),
            Value::Bool(true) => "on".to_string(),
            Value::Bool(false) => "off".to_string(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_persisted_value() {
        let state = |v| EntityState::new("sensor.x", v, None).persisted_value();
        assert_eq!(state(Value::Null), "unknown");
        assert_eq!(state(json!(true)), "on");
        assert_eq!(state(json!(false)), "off");
        assert_eq!(state(json!("portrait")), "portrait");
        assert_eq!(state(json!(87)), "87");
    }

    #[test]
    fn test_presentation_is_serialized_when_set() {
        let bare = serde_json::to_value(EntityState::new("switch.vaca_1_mute", json!(true), None))
            .unwrap();
        assert!(bare.get("icon").is_none());

        let state = EntityState::new("switch.vaca_1_dark_mode", json!(false), None)
            .with_presentation(Some("mdi:compare".into()), Some(EntityCategory::Config));
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["icon"], json!("mdi:compare"));
        assert_eq!(value["category"], json!("config"));
    }

    #[test]
    fn test_state_serialization() {
        let state = EntityState::new("switch.vaca_1_mute", json!(true), None);
        let serialized = serde_json::to_string(&state).unwrap();
        let deserialized: EntityState = serde_json::from_str(&serialized).unwrap();
        assert_eq!(state, deserialized);
    }
}
