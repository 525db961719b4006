use application::{EventBridge, InMemoryStateStore, RouteOutcome, SatelliteManager};
use domain::{SatelliteDevice, SatelliteId};
use infrastructure::{MqttClient, MqttMessage, Topics};
use serde_json::json;
use std::sync::Arc;

fn message(topic: &str, payload: serde_json::Value) -> MqttMessage {
    MqttMessage {
        topic: topic.to_string(),
        payload: payload.to_string().into_bytes(),
        pkid: 1,
    }
}

#[tokio::test]
async fn test_bridge_routes_event_envelopes() {
    let store = Arc::new(InMemoryStateStore::new());
    let manager = SatelliteManager::new(store.clone(), store.clone());
    manager
        .setup_entry(
            "entry-1",
            SatelliteDevice::new(SatelliteId::new("vaca-1").unwrap(), "dev-1"),
        )
        .await
        .unwrap();

    // Never connects; only the routing path is exercised
    let client = MqttClient::new("127.0.0.1", 1, "bridge-test", None)
        .await
        .unwrap();
    let bridge = EventBridge::new(client, Topics::new("vaca"), manager.router());

    let outcome = bridge.handle_message(&message(
        "vaca/dev-1/event",
        json!({"type": "stt_text", "data": {"text": "what time is it"}}),
    ));
    assert_eq!(outcome, Some(RouteOutcome::Delivered(1)));
    assert_eq!(
        store.current("sensor.vaca_1_stt").unwrap().value,
        json!("what time is it")
    );

    assert_eq!(
        bridge.handle_message(&message("vaca/dev-9/event", json!({"type": "status_update", "data": {}}))),
        Some(RouteOutcome::UnknownDevice)
    );
    assert_eq!(
        bridge.handle_message(&message("vaca/dev-1/event", json!({"type": "run-satellite"}))),
        None
    );
    assert_eq!(
        bridge.handle_message(&message("vaca/dev-1/action", json!({"type": "status_update"}))),
        None
    );
}
