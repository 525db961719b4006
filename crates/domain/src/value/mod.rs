//! Total value coercions from device payloads to displayable states.
//!
//! None of these functions fail: malformed input degrades to a sentinel
//! (epoch timestamp, `null`, or the raw string).

mod coerce;
mod path;

pub use coerce::{
    MAX_TEXT_LEN, charging_label, coerce_bool, coerce_native, coerce_text, coerce_timestamp,
    is_truthy,
};
pub use path::{get_path, path_root};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Persisted states that carry no information worth restoring.
pub const SENTINEL_STATES: [&str; 2] = ["unknown", "unavailable"];

/// How a raw field value becomes an entity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coercion {
    /// Numeric-looking strings become integers
    Native,
    /// Boolean-like values (`true`, `"yes"`, `"1"`)
    Boolean,
    /// Free text, truncated to the state limit; empty text is ignored
    Text,
    /// ISO-8601 timestamp, epoch on failure
    Timestamp,
    /// `charging` / `not_charging`
    ChargingLabel,
}

impl Coercion {
    /// Coerce a value delivered by the device.
    ///
    /// Returns `None` only when the value carries nothing to display
    /// (empty or missing text), in which case the event is ignored.
    pub fn apply(&self, raw: &Value) -> Option<Value> {
        match self {
            Self::Native => Some(coerce_native(raw)),
            Self::Boolean => Some(Value::Bool(coerce_bool(raw))),
            Self::Text => match raw {
                Value::Null => None,
                Value::String(s) if s.is_empty() => None,
                Value::String(s) => Some(Value::String(coerce_text(s))),
                other => Some(Value::String(coerce_text(&other.to_string()))),
            },
            Self::Timestamp => {
                let text = raw.as_str().unwrap_or_default();
                Some(Value::String(coerce_timestamp(text).to_rfc3339()))
            }
            Self::ChargingLabel => Some(Value::String(charging_label(raw).to_string())),
        }
    }

    /// Coerce a persisted state string back into a displayable value.
    ///
    /// Persisted booleans are written as `on` / `off`; labels are restored verbatim.
    pub fn restore(&self, persisted: &str) -> Option<Value> {
        if SENTINEL_STATES.contains(&persisted) {
            return None;
        }
        match self {
            Self::Native => Some(coerce_native(&Value::String(persisted.to_string()))),
            Self::Boolean => Some(Value::Bool(
                persisted == "on" || coerce_bool(&Value::String(persisted.to_string())),
            )),
            Self::Text => self.apply(&Value::String(persisted.to_string())),
            Self::Timestamp => Some(Value::String(coerce_timestamp(persisted).to_rfc3339())),
            Self::ChargingLabel => Some(Value::String(persisted.to_string())),
        }
    }
}
