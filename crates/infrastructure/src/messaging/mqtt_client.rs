use anyhow::{Context, Result};
use parking_lot::RwLock;
use rumqttc::{AsyncClient, Event, EventLoop, LastWill, MqttOptions, Packet, Publish, QoS};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

const KEEP_ALIVE: Duration = Duration::from_secs(20);
const RECONNECT_DELAY: Duration = Duration::from_secs(1);
const REQUEST_CAPACITY: usize = 100;
const INBOUND_CAPACITY: usize = 250;

/// One inbound publish, waiting for the consumer's ack.
#[derive(Clone, Debug)]
pub struct MqttMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub pkid: u16,
}

/// Outbound publishing seam, mocked in the publisher tests.
#[async_trait::async_trait]
pub trait MqttPublisherClient: Send + Sync {
    async fn publish_bytes(
        &self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<()>;
}

/// Broker connection with a persistent session and manual acks.
///
/// Inbound publishes are fanned out on a broadcast channel; topic filters
/// are remembered and subscribed again after every reconnect.
#[derive(Clone)]
pub struct MqttClient {
    client: AsyncClient,
    inbound: broadcast::Sender<MqttMessage>,
    filters: Arc<RwLock<Vec<String>>>,
}

impl MqttClient {
    pub async fn new(
        host: &str,
        port: u16,
        client_id: &str,
        last_will: Option<LastWill>,
    ) -> Result<Self> {
        let mut options = MqttOptions::new(client_id, host, port);
        options
            .set_keep_alive(KEEP_ALIVE)
            .set_clean_session(false)
            .set_manual_acks(true);
        if let Some(will) = last_will {
            options.set_last_will(will);
        }

        let (client, eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let (inbound, _) = broadcast::channel(INBOUND_CAPACITY);
        let this = Self {
            client,
            inbound,
            filters: Arc::new(RwLock::new(Vec::new())),
        };

        tokio::spawn(this.clone().drive(eventloop));
        Ok(this)
    }

    async fn drive(self, mut eventloop: EventLoop) {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => self.forward(publish),
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("MQTT connected");
                    self.resubscribe().await;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "MQTT connection error, retrying");
                    tokio::time::sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }

    fn forward(&self, publish: Publish) {
        let message = MqttMessage {
            topic: publish.topic,
            payload: publish.payload.to_vec(),
            pkid: publish.pkid,
        };
        // Unacked messages are redelivered once a consumer is listening
        if let Err(broadcast::error::SendError(dropped)) = self.inbound.send(message) {
            debug!(topic = %dropped.topic, "No consumer for MQTT message");
        }
    }

    async fn resubscribe(&self) {
        let filters = self.filters.read().clone();
        for filter in filters {
            if let Err(e) = self.client.subscribe(filter.as_str(), QoS::AtLeastOnce).await {
                warn!(topic = %filter, error = %e, "Failed to re-subscribe");
            }
        }
    }

    pub fn subscribe_messages(&self) -> broadcast::Receiver<MqttMessage> {
        self.inbound.subscribe()
    }

    pub async fn publish(&self, topic: &str, payload: &str, retain: bool) -> Result<()> {
        self.publish_bytes(topic, payload.as_bytes(), QoS::AtLeastOnce, retain)
            .await
    }

    /// Subscribe now and after every reconnect. Rejected filters are not kept.
    pub async fn subscribe(&self, filter: &str) -> Result<()> {
        self.client
            .subscribe(filter, QoS::AtLeastOnce)
            .await
            .with_context(|| format!("Failed to subscribe to {filter}"))?;

        let mut filters = self.filters.write();
        if !filters.iter().any(|f| f == filter) {
            filters.push(filter.to_string());
        }
        Ok(())
    }

    /// Topic filters restored on reconnect.
    pub fn filters(&self) -> Vec<String> {
        self.filters.read().clone()
    }

    pub async fn ack(&self, topic: &str, pkid: u16) -> Result<()> {
        let mut publish = Publish::new(topic, QoS::AtLeastOnce, Vec::new());
        publish.pkid = pkid;
        self.client
            .ack(&publish)
            .await
            .with_context(|| format!("Failed to ack packet {pkid}"))
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.client
            .disconnect()
            .await
            .context("Failed to disconnect from broker")
    }
}

#[async_trait::async_trait]
impl MqttPublisherClient for MqttClient {
    async fn publish_bytes(
        &self,
        topic: &str,
        payload: &[u8],
        qos: QoS,
        retain: bool,
    ) -> Result<()> {
        self.client
            .publish(topic, qos, retain, payload)
            .await
            .with_context(|| format!("Failed to publish to {topic}"))
    }
}
