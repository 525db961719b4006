//! Infrastructure layer - External integrations

pub mod config;
pub mod database;
pub mod messaging;

pub use database::SqliteStateStore;
pub use messaging::mqtt_client::{MqttClient, MqttMessage};
pub use messaging::{SatellitePublisher, Topics};
