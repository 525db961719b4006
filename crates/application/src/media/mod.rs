use serde_json::{Map, Value, json};
use std::sync::Arc;

use domain::{CustomAction, SatelliteDevice};

/// Media and notification commands for one satellite.
#[derive(Clone)]
pub struct MediaCommands {
    device: Arc<SatelliteDevice>,
}

impl MediaCommands {
    pub fn new(device: Arc<SatelliteDevice>) -> Self {
        Self { device }
    }

    pub fn play(&self) {
        self.device.send_custom_action(CustomAction::Play, None);
    }

    pub fn pause(&self) {
        self.device.send_custom_action(CustomAction::Pause, None);
    }

    pub fn stop(&self) {
        self.device.send_custom_action(CustomAction::Stop, None);
    }

    pub fn play_media(&self, url: &str) {
        self.send(CustomAction::PlayMedia, "url", json!(url));
    }

    /// Volume is clamped to `0.0..=1.0`; NaN becomes 0.
    pub fn set_volume(&self, volume: f64) {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        self.send(CustomAction::SetVolume, "volume", json!(volume));
    }

    pub fn toast_message(&self, message: &str) {
        self.send(CustomAction::ToastMessage, "message", json!(message));
    }

    fn send(&self, action: CustomAction, key: &str, value: Value) {
        let mut payload = Map::new();
        payload.insert(key.to_string(), value);
        self.device.send_custom_action(action, Some(payload));
    }
}
