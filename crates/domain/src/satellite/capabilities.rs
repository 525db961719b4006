use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::value::is_truthy;

const UNKNOWN: &str = "unknown";

/// Hardware sensor kinds reported in the capability inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Accelerometer,
    Light,
    Proximity,
}

impl SensorKind {
    /// Platform sensor type code.
    pub fn type_code(&self) -> i64 {
        match self {
            Self::Accelerometer => 1,
            Self::Light => 5,
            Self::Proximity => 8,
        }
    }
}

/// One entry of the `sensors` capability list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SensorDescriptor {
    #[serde(rename = "type", default)]
    pub sensor_type: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Runtime capability flags reported by the satellite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Capabilities(Map<String, Value>);

impl Capabilities {
    pub fn new(flags: Map<String, Value>) -> Self {
        Self(flags)
    }

    /// Non-object payloads produce an empty capability set.
    pub fn from_value(value: &Value) -> Self {
        value
            .as_object()
            .map(|map| Self(map.clone()))
            .unwrap_or_default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(is_truthy)
    }

    pub fn has_battery(&self) -> bool {
        self.flag("has_battery")
    }

    pub fn has_front_camera(&self) -> bool {
        self.flag("has_front_camera")
    }

    pub fn has_dnd(&self) -> bool {
        self.flag("has_dnd")
    }

    pub fn app_version(&self) -> Option<&str> {
        self.0
            .get("app_version")
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Sensor inventory. Entries may be objects or JSON-encoded strings;
    /// anything else is skipped.
    pub fn sensors(&self) -> Vec<SensorDescriptor> {
        let Some(entries) = self.0.get("sensors").and_then(Value::as_array) else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(encoded) => serde_json::from_str(encoded).ok(),
                Value::Object(_) => serde_json::from_value(entry.clone()).ok(),
                _ => None,
            })
            .collect()
    }

    pub fn has_sensor(&self, kind: SensorKind) -> bool {
        self.sensors()
            .iter()
            .any(|s| s.sensor_type == Some(kind.type_code()))
    }

    pub fn has_light_sensor(&self) -> bool {
        self.has_sensor(SensorKind::Light)
    }

    pub fn supports_bump(&self) -> bool {
        self.has_sensor(SensorKind::Accelerometer)
    }

    pub fn supports_proximity(&self) -> bool {
        self.has_sensor(SensorKind::Proximity)
    }

    pub fn sensor_names(&self) -> Vec<String> {
        self.sensors().into_iter().filter_map(|s| s.name).collect()
    }

    /// Diagnostic attributes shown alongside the app version.
    pub fn summary(&self) -> Value {
        let or_unknown = |key: &str| self.0.get(key).cloned().unwrap_or_else(|| json!(UNKNOWN));
        json!({
            "device_signature": or_unknown("device_signature"),
            "android_version": or_unknown("release"),
            "has_battery": or_unknown("has_battery"),
            "has_front_camera": or_unknown("has_front_camera"),
            "has_light_sensor": self.has_light_sensor(),
            "sensors": self.sensor_names(),
        })
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}
