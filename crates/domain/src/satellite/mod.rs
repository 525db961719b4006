mod capabilities;
mod device;
mod info;
mod listener;
mod satellite_id;

pub use capabilities::{Capabilities, SensorDescriptor, SensorKind};
pub use device::SatelliteDevice;
pub use info::{AVAILABLE_WAKE_WORDS, SatelliteInfo, WakeModel, WakeProgram, wake_word_label};
pub use listener::{ActionListener, SettingsListener, UpdateHandler};
pub use satellite_id::SatelliteId;

#[cfg(test)]
pub use listener::{MockActionListener, MockSettingsListener, MockUpdateHandler};
