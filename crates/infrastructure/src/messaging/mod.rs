pub mod envelope;
pub mod mqtt_client;
pub mod satellite_publisher;

pub use envelope::Topics;
pub use satellite_publisher::{OutboundMessage, SatellitePublisher, run_publisher};
