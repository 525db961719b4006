use serde_json::{Map, Value};

use super::SatelliteId;
use crate::command::Command;
use crate::event::UpdateClass;

/// Consumer of inbound updates for one update class.
///
/// Device models and the signal dispatcher hold these as weak references;
/// the entity owning the handler controls its lifetime.
#[cfg_attr(test, mockall::automock)]
pub trait UpdateHandler: Send + Sync {
    fn handle_update(&self, class: UpdateClass, data: &Value);
}

/// Notified after a custom setting changed value.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsListener: Send + Sync {
    fn settings_changed(&self, satellite_id: &SatelliteId, settings: &Map<String, Value>);
}

/// Outbound action sink.
#[cfg_attr(test, mockall::automock)]
pub trait ActionListener: Send + Sync {
    fn action_requested(&self, satellite_id: &SatelliteId, command: &Command);
}
