use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_topic_prefix")]
    pub topic_prefix: String,
}

fn default_topic_prefix() -> String {
    "vaca".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "sqlite://satellite_state.db?mode=rwc".to_string()
}

/// One configured satellite (a config entry).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SatelliteConfig {
    pub entry_id: String,
    pub satellite_id: String,
    /// Transport-level device id; defaults to the satellite id
    #[serde(default)]
    pub device_id: Option<String>,
    /// Capabilities known ahead of the first capabilities update
    #[serde(default)]
    pub capabilities: Option<Value>,
}

impl SatelliteConfig {
    pub fn device_id(&self) -> &str {
        self.device_id.as_deref().unwrap_or(&self.satellite_id)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentConfig {
    pub agent_id: String,
    pub mqtt: MqttConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub satellites: Vec<SatelliteConfig>,
}

impl AgentConfig {
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .set_default("agent_id", "satellite-agent")?
            .set_default("mqtt.host", "localhost")?
            .set_default("mqtt.port", 1883)?
            .set_default("mqtt.topic_prefix", default_topic_prefix())?
            // Local config file is required; starting without satellites is pointless
            .add_source(File::with_name(&format!("{}/default", config_dir)).required(true))
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            // Environment variables (e.g. VACA__MQTT__HOST=10.0.0.1)
            .add_source(Environment::with_prefix("VACA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
