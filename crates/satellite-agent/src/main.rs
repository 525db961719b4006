use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use application::{EventBridge, SatelliteManager};
use infrastructure::config::AgentConfig;
use infrastructure::messaging::mqtt_client::MqttPublisherClient;
use infrastructure::messaging::run_publisher;
use infrastructure::{MqttClient, SatellitePublisher, SqliteStateStore, Topics};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config directory
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// Override Agent ID
    #[arg(long)]
    agent_id: Option<String>,

    /// Override MQTT Host
    #[arg(long)]
    mqtt_host: Option<String>,

    /// Override MQTT Port
    #[arg(long)]
    mqtt_port: Option<u16>,
}

async fn run() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,satellite_agent=debug,application=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Satellite agent starting");
    let args = Args::parse();

    // 1. Configuration
    let mut config = AgentConfig::load(&args.config_dir)?;
    if let Some(id) = args.agent_id {
        config.agent_id = id;
    }
    if let Some(host) = args.mqtt_host {
        config.mqtt.host = host;
    }
    if let Some(port) = args.mqtt_port {
        config.mqtt.port = port;
    }
    let agent_id = config.agent_id.clone();
    info!(agent_id = %agent_id, satellites = config.satellites.len(), "Loaded configuration");

    // 2. Restore store
    info!(database_url = %config.storage.database_url, "Opening restore store");
    let store = Arc::new(SqliteStateStore::new(&config.storage.database_url).await?);

    // 3. MQTT
    let topics = Topics::new(config.mqtt.topic_prefix.as_str());
    let status_topic = topics.agent_status(&agent_id);
    let last_will = rumqttc::LastWill::new(
        &status_topic,
        serde_json::json!({ "status": "OFFLINE" }).to_string(),
        rumqttc::QoS::AtLeastOnce,
        true,
    );
    info!(host = %config.mqtt.host, port = %config.mqtt.port, "Connecting to MQTT broker");
    let mqtt_client = MqttClient::new(
        &config.mqtt.host,
        config.mqtt.port,
        &format!("satellite-{}", agent_id),
        Some(last_will),
    )
    .await?;

    // 4. Outbound publisher
    let cancel = CancellationToken::new();
    let (publisher, outbound_rx) = SatellitePublisher::new(topics.clone());
    let publisher = Arc::new(publisher);
    let client: Arc<dyn MqttPublisherClient> = Arc::new(mqtt_client.clone());
    let publisher_handle = tokio::spawn(run_publisher(client, outbound_rx, cancel.clone()));

    // 5. Satellites
    let manager = SatelliteManager::new(store.clone(), publisher.clone());
    let ready = satellite_agent::setup_satellites(&manager, &config.satellites, &publisher).await;
    if ready < config.satellites.len() {
        warn!(ready, configured = config.satellites.len(), "Some satellites were not set up");
    }

    // 6. Inbound events
    let bridge = EventBridge::new(mqtt_client.clone(), topics.clone(), manager.router());
    let bridge_cancel = cancel.clone();
    let bridge_handle = tokio::spawn(async move { bridge.start(bridge_cancel).await });

    let online = serde_json::json!({ "status": "ONLINE" }).to_string();
    if let Err(e) = mqtt_client.publish(&status_topic, &online, true).await {
        warn!(error = %e, "Failed to publish ONLINE status");
    }
    info!("Satellite agent running");

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(err) => warn!(error = %err, "Unable to listen for shutdown signal"),
    }

    // Persist entity states before tearing anything down
    match manager.snapshot_all().await {
        Ok(count) => info!(count, "Saved entity states"),
        Err(e) => warn!(error = %e, "Failed to save entity states"),
    }

    cancel.cancel();
    let _ = bridge_handle.await;
    let _ = publisher_handle.await;

    let offline = serde_json::json!({ "status": "OFFLINE" }).to_string();
    let _ = mqtt_client.publish(&status_topic, &offline, true).await;
    let _ = mqtt_client.disconnect().await;

    info!("Good bye");
    Ok(())
}

fn main() {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(run()) {
        eprintln!("\nCRITICAL ERROR: {:?}", e);
        std::process::exit(1);
    }
}
