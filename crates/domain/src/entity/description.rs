use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::UpdateClass;
use crate::satellite::{Capabilities, SatelliteId};
use crate::value::{Coercion, get_path, is_truthy, path_root};

/// Entity platform an adapter is exposed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Sensor,
    BinarySensor,
    Switch,
    Select,
    Button,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sensor => "sensor",
            Self::BinarySensor => "binary_sensor",
            Self::Switch => "switch",
            Self::Select => "select",
            Self::Button => "button",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Config,
    Diagnostic,
}

/// Where in an update payload an entity finds its field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// `data.sensors.<key>`
    Sensors,
    /// `data.settings.<key>`
    Settings,
    /// `<key>` of the device capabilities, only when truthy
    Capability,
    /// `data.text`
    Text,
    /// Dot-separated path, considered only when its first segment is present
    Path(String),
}

impl FieldSource {
    /// Pull the raw field for `key` out of an update.
    ///
    /// `None` means the update does not concern this entity and must be
    /// ignored. A present path that resolves to nothing yields `Some(null)`.
    pub fn extract(&self, key: &str, data: &Value, capabilities: &Capabilities) -> Option<Value> {
        match self {
            Self::Sensors => nested_field(data, "sensors", key),
            Self::Settings => nested_field(data, "settings", key),
            Self::Capability => capabilities.get(key).filter(|v| is_truthy(v)).cloned(),
            Self::Text => data.get("text").cloned(),
            Self::Path(path) => {
                if !data.get(path_root(path)).is_some_and(is_truthy) {
                    return None;
                }
                Some(get_path(path, data).cloned().unwrap_or(Value::Null))
            }
        }
    }
}

fn nested_field(data: &Value, section: &str, key: &str) -> Option<Value> {
    data.get(section)
        .filter(|v| is_truthy(v))
        .and_then(Value::as_object)
        .and_then(|fields| fields.get(key))
        .cloned()
}

/// The update class and field an entity follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub class: UpdateClass,
    pub source: FieldSource,
}

/// Configuration of one entity adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDescription {
    pub key: String,
    pub platform: Platform,
    #[serde(default)]
    pub subscription: Option<Subscription>,
    pub coercion: Coercion,
    /// Restore the last persisted state on startup
    pub restore: bool,
    /// State before any restore or update
    #[serde(default)]
    pub default: Value,
    /// The device reports this entity's state back; never echo it
    #[serde(default)]
    pub feedback_only: bool,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub category: Option<EntityCategory>,
}

impl EntityDescription {
    pub fn new(platform: Platform, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            platform,
            subscription: None,
            coercion: Coercion::Native,
            restore: true,
            default: Value::Null,
            feedback_only: false,
            icon: None,
            category: None,
        }
    }

    pub fn subscribe(mut self, class: UpdateClass, source: FieldSource) -> Self {
        self.subscription = Some(Subscription { class, source });
        self
    }

    pub fn coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = coercion;
        self
    }

    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = default.into();
        self
    }

    pub fn feedback_only(mut self) -> Self {
        self.feedback_only = true;
        self
    }

    pub fn without_restore(mut self) -> Self {
        self.restore = false;
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn category(mut self, category: EntityCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Platform entity id, e.g. `sensor.vaca_1234_battery_level`.
    pub fn entity_id(&self, satellite_id: &SatelliteId) -> String {
        let slug: String = satellite_id
            .as_str()
            .chars()
            .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
            .collect();
        format!("{}.{}_{}", self.platform.as_str(), slug, self.key)
    }
}
