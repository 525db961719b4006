use rumqttc::QoS;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use domain::entity::{EntityState, StateWriter};
use domain::satellite::{ActionListener, SettingsListener};
use domain::{Command, SatelliteId};

use crate::messaging::envelope::{Topics, command_event, settings_event};
use crate::messaging::mqtt_client::MqttPublisherClient;

/// One message waiting to be published.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retain: bool,
}

/// Outbound side of the satellite protocol.
///
/// Device listeners are synchronous, so every callback only encodes and
/// enqueues; [`run_publisher`] drains the queue onto the broker.
#[derive(Clone)]
pub struct SatellitePublisher {
    topics: Topics,
    tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl SatellitePublisher {
    pub fn new(topics: Topics) -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { topics, tx }, rx)
    }

    fn enqueue(&self, topic: String, payload: &Value, retain: bool) {
        let message = OutboundMessage {
            topic,
            payload: payload.to_string().into_bytes(),
            retain,
        };
        if let Err(e) = self.tx.send(message) {
            debug!(topic = %e.0.topic, "Publisher stopped, dropping outbound message");
        }
    }
}

impl ActionListener for SatellitePublisher {
    fn action_requested(&self, satellite_id: &SatelliteId, command: &Command) {
        debug!(satellite_id = %satellite_id, action = %command.action, "Sending custom action");
        self.enqueue(
            self.topics.action(satellite_id.as_str()),
            &command_event(command),
            false,
        );
    }
}

impl SettingsListener for SatellitePublisher {
    fn settings_changed(&self, satellite_id: &SatelliteId, settings: &Map<String, Value>) {
        debug!(satellite_id = %satellite_id, count = settings.len(), "Sending settings");
        self.enqueue(
            self.topics.settings(satellite_id.as_str()),
            &settings_event(settings),
            false,
        );
    }
}

impl StateWriter for SatellitePublisher {
    fn write_state(&self, state: &EntityState) {
        let payload = serde_json::json!({
            "state": state.value,
            "attributes": state.attributes,
            "updated_at": state.updated_at,
            "icon": state.icon,
            "entity_category": state.category,
        });
        self.enqueue(self.topics.state(&state.entity_id), &payload, true);
    }
}

/// Publish queued messages until cancelled, then flush what is left.
pub async fn run_publisher(
    client: Arc<dyn MqttPublisherClient>,
    mut rx: mpsc::UnboundedReceiver<OutboundMessage>,
    cancel: CancellationToken,
) {
    info!("Starting satellite publisher");
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            message = rx.recv() => match message {
                Some(message) => publish(client.as_ref(), message).await,
                None => return,
            },
        }
    }

    while let Ok(message) = rx.try_recv() {
        publish(client.as_ref(), message).await;
    }
    info!("Satellite publisher stopped");
}

async fn publish(client: &dyn MqttPublisherClient, message: OutboundMessage) {
    if let Err(e) = client
        .publish_bytes(
            &message.topic,
            &message.payload,
            QoS::AtLeastOnce,
            message.retain,
        )
        .await
    {
        warn!(topic = %message.topic, error = %e, "Failed to publish outbound message");
    }
}
