//! Broker client adapter.
//!
//! Owns the one MQTT connection for the whole process. The connection is an
//! explicit object injected (as an `Arc`) into every component that
//! publishes; inbound messages are fanned out on a broadcast channel that
//! the message router consumes.
//!
//! A broker that is down never crashes the process: the event-loop task
//! keeps retrying in the background while `publish` fails fast with
//! [`AdapterError::NotConnected`] and control actions keep mutating the
//! store in a degraded state.

use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::error::{AdapterError, AdapterResult};
use crate::mqtt::MqttConfig;

/// Capacity of the inbound broadcast channel.
const INBOUND_CHANNEL_CAPACITY: usize = 1024;

/// Connection state of the broker client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
        }
    }
}

/// A raw message delivered by the broker, before decoding.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// MQTT broker client.
pub struct BrokerClient {
    client: AsyncClient,
    status: Arc<RwLock<ConnectionStatus>>,
    inbound_tx: broadcast::Sender<InboundMessage>,
}

impl BrokerClient {
    /// Build the client and spawn its event-loop task.
    ///
    /// This never blocks on the network: the actual connection is
    /// established (and re-established) by the background task, and the
    /// configured topics are subscribed on every connection acknowledgment.
    pub fn connect(config: &MqttConfig) -> Self {
        let client_id = config
            .client_id
            .clone()
            .unwrap_or_else(|| format!("homesync-{}", uuid::Uuid::new_v4()));

        let mut options = MqttOptions::new(client_id, &config.broker, config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive));
        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            options.set_credentials(user, pass);
        }

        let (client, eventloop) = AsyncClient::new(options, 64);
        let (inbound_tx, _) = broadcast::channel(INBOUND_CHANNEL_CAPACITY);
        let status = Arc::new(RwLock::new(ConnectionStatus::Disconnected));

        tokio::spawn(Self::run_event_loop(
            client.clone(),
            eventloop,
            status.clone(),
            inbound_tx.clone(),
            config.subscribe_topics.clone(),
            config.full_broker_addr(),
        ));

        Self {
            client,
            status,
            inbound_tx,
        }
    }

    /// The delivery context. Forwarding to the broadcast channel is the only
    /// work done per message; decoding and persistence happen on the
    /// router's task.
    async fn run_event_loop(
        client: AsyncClient,
        mut eventloop: rumqttc::EventLoop,
        status: Arc<RwLock<ConnectionStatus>>,
        inbound_tx: broadcast::Sender<InboundMessage>,
        topics: Vec<String>,
        broker_addr: String,
    ) {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    *status.write().await = ConnectionStatus::Connected;
                    info!(broker = %broker_addr, "broker connection acknowledged");
                    for topic in &topics {
                        if let Err(e) = client.subscribe(topic, QoS::AtLeastOnce).await {
                            warn!(%topic, error = %e, "failed to subscribe");
                        }
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let _ = inbound_tx.send(InboundMessage {
                        topic: publish.topic.clone(),
                        payload: publish.payload.to_vec(),
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    let was_connected = {
                        let mut s = status.write().await;
                        let was = *s == ConnectionStatus::Connected;
                        *s = ConnectionStatus::Disconnected;
                        was
                    };
                    if was_connected {
                        warn!(broker = %broker_addr, error = %e, "broker connection lost, retrying");
                    } else {
                        debug!(broker = %broker_addr, error = %e, "broker unreachable, retrying");
                    }
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    /// Subscribe the router (or a test) to the raw inbound stream.
    pub fn subscribe_inbound(&self) -> broadcast::Receiver<InboundMessage> {
        self.inbound_tx.subscribe()
    }

    /// Publish a payload, failing fast when the connection is down.
    pub async fn publish(
        &self,
        topic: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> AdapterResult<()> {
        if !self.is_connected() {
            return Err(AdapterError::NotConnected);
        }
        self.client
            .publish(topic.into(), QoS::AtLeastOnce, false, payload.into())
            .await
            .map_err(|e| AdapterError::Publish(e.to_string()))
    }

    /// Subscribe to an additional topic on the live connection.
    pub async fn subscribe(&self, topic: &str) -> AdapterResult<()> {
        if !self.is_connected() {
            return Err(AdapterError::NotConnected);
        }
        self.client
            .subscribe(topic, QoS::AtLeastOnce)
            .await
            .map_err(|e| AdapterError::Subscription(e.to_string()))
    }

    /// Current connection status. Returns `Disconnected` if the lock is
    /// contended, which is the safe default for a health probe.
    pub fn connection_status(&self) -> ConnectionStatus {
        self.status
            .try_read()
            .map(|s| *s)
            .unwrap_or(ConnectionStatus::Disconnected)
    }

    pub fn is_connected(&self) -> bool {
        self.connection_status() == ConnectionStatus::Connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Port 1 is never a live broker, so the client stays degraded.
    fn disconnected_client() -> BrokerClient {
        BrokerClient::connect(&MqttConfig::new("127.0.0.1").with_port(1))
    }

    #[tokio::test]
    async fn test_publish_while_disconnected_fails_fast() {
        let client = disconnected_client();
        let err = client
            .publish("device/lighting/status", b"ON".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::NotConnected));
    }

    #[tokio::test]
    async fn test_subscribe_while_disconnected_fails_fast() {
        let client = disconnected_client();
        let err = client.subscribe("device/lighting").await.unwrap_err();
        assert!(matches!(err, AdapterError::NotConnected));
    }

    #[tokio::test]
    async fn test_starts_disconnected() {
        let client = disconnected_client();
        assert_eq!(client.connection_status(), ConnectionStatus::Disconnected);
    }
}
