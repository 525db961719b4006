use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use infrastructure::messaging::Topics;
use infrastructure::messaging::envelope::decode_update;
use infrastructure::{MqttClient, MqttMessage};

use crate::router::{RouteOutcome, UpdateRouter};

/// Feeds satellite events received over MQTT into the update router.
pub struct EventBridge {
    mqtt_client: MqttClient,
    topics: Topics,
    router: UpdateRouter,
}

impl EventBridge {
    pub fn new(mqtt_client: MqttClient, topics: Topics, router: UpdateRouter) -> Self {
        Self {
            mqtt_client,
            topics,
            router,
        }
    }

    pub async fn start(&self, cancel: CancellationToken) {
        let filter = self.topics.event_filter();
        let mut rx = self.mqtt_client.subscribe_messages();
        if let Err(e) = self.mqtt_client.subscribe(&filter).await {
            error!(topic = %filter, error = %e, "Failed to subscribe to satellite events");
            return;
        }

        info!(topic = %filter, "Listening for satellite events");

        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => break,
                received = rx.recv() => received,
            };

            match received {
                Ok(msg) => {
                    if self.topics.device_of_event(&msg.topic).is_none() {
                        continue;
                    }
                    self.handle_message(&msg);

                    if let Err(e) = self.mqtt_client.ack(&msg.topic, msg.pkid).await {
                        warn!(topic = %msg.topic, error = %e, "Failed to ack event");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!(skipped = count, "Event bridge lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    warn!("Event channel closed");
                    break;
                }
            }
        }
        info!("Event bridge stopped");
    }

    /// Decode and route one message. Returns `None` when it was not routable.
    pub fn handle_message(&self, msg: &MqttMessage) -> Option<RouteOutcome> {
        let device_id = self.topics.device_of_event(&msg.topic)?;
        match decode_update(device_id, &msg.payload) {
            Ok(event) => {
                let outcome = self.router.route(&event);
                debug!(device_id, class = %event.class, ?outcome, "Routed satellite event");
                Some(outcome)
            }
            Err(e) => {
                debug!(device_id, error = %e, "Dropping undecodable event");
                None
            }
        }
    }
}
