//! Message router.
//!
//! Consumes the broker client's inbound stream on its own task. Per
//! message: decode JSON failing closed, stamp a timestamp if absent,
//! append to the bounded topic cache, then dispatch to the per-topic
//! effect. A malformed payload is logged and dropped; it never disturbs
//! delivery of the next message.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use homesync_core::{Device, TelemetrySample};
use homesync_storage::TelemetryStore;

use crate::cache::TopicCache;
use crate::client::InboundMessage;
use crate::service::ControlGateway;

/// Routes inbound bus messages to state updates and telemetry appends.
pub struct MessageRouter {
    gateway: Arc<ControlGateway>,
    telemetry: Arc<TelemetryStore>,
    cache: Arc<TopicCache>,
}

impl MessageRouter {
    pub fn new(
        gateway: Arc<ControlGateway>,
        telemetry: Arc<TelemetryStore>,
        cache: Arc<TopicCache>,
    ) -> Self {
        Self {
            gateway,
            telemetry,
            cache,
        }
    }

    /// Spawn the routing task over a broadcast receiver from the broker
    /// client. Runs until the channel closes at process shutdown.
    pub fn spawn(
        self: Arc<Self>,
        mut rx: broadcast::Receiver<InboundMessage>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(message) => self.handle(&message.topic, &message.payload).await,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "router lagged behind message delivery");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Process one inbound message.
    pub async fn handle(&self, topic: &str, payload: &[u8]) {
        let mut object: Map<String, Value> = match serde_json::from_slice(payload) {
            Ok(object) => object,
            Err(e) => {
                warn!(%topic, error = %e, "dropping malformed payload");
                return;
            }
        };

        object
            .entry("timestamp".to_string())
            .or_insert_with(|| Value::from(chrono::Utc::now().timestamp_millis()));

        self.cache.push(topic, Value::Object(object.clone())).await;
        self.dispatch(topic, &object).await;
    }

    async fn dispatch(&self, topic: &str, payload: &Map<String, Value>) {
        match topic {
            "device/lighting" => match command(payload) {
                Some("BRIGHTER") | Some("DIMMER") => {
                    self.bus_status(Device::Lighting, "on").await;
                }
                Some("OFF") => self.bus_status(Device::Lighting, "off").await,
                other => debug!(?other, "ignored lighting command"),
            },
            "device/water_heater" => match command(payload) {
                Some("ON") => self.bus_status(Device::WaterHeater, "on").await,
                Some("OFF") => self.bus_status(Device::WaterHeater, "off").await,
                other => debug!(?other, "ignored water heater command"),
            },
            "device/camera" => match command(payload) {
                Some("ON") => self.bus_status(Device::Camera, "on").await,
                Some("OFF") => self.bus_status(Device::Camera, "off").await,
                other => debug!(?other, "ignored camera command"),
            },
            "device/fps" => {
                if let Some(fps) = payload.get("fps").and_then(Value::as_f64) {
                    self.append(TelemetrySample::Fps {
                        fps,
                        timestamp: timestamp(payload),
                    });
                } else {
                    warn!("fps payload missing numeric fps field");
                }
            }
            "device/surveillance_camera" => {
                if let Some(status) = payload.get("status").and_then(Value::as_str) {
                    self.append(TelemetrySample::SurveillanceCamera {
                        status: status.to_string(),
                        timestamp: timestamp(payload),
                    });
                } else {
                    warn!("surveillance camera payload missing status field");
                }
            }
            "device/aircon" => {
                let temperature = payload.get("temperature").and_then(Value::as_f64);
                let humidity = payload.get("humidity").and_then(Value::as_f64);
                match (temperature, humidity) {
                    (Some(temperature), Some(humidity)) => {
                        self.append(TelemetrySample::Aircon {
                            temperature,
                            humidity,
                            cooling_status: string_field(payload, "cooling_status"),
                            dehumidifying_status: string_field(payload, "dehumidifying_status"),
                            timestamp: timestamp(payload),
                        });
                    }
                    _ => warn!("aircon payload missing temperature or humidity, discarded"),
                }
            }
            // Everything else (device/temperature, device/light_control, ...)
            // is cached for live reads but has no dispatch effect.
            _ => {}
        }
    }

    async fn bus_status(&self, device: Device, status: &str) {
        match self.gateway.apply_bus_command(device, status).await {
            Ok(true) => debug!(device = %device, status, "bus command applied"),
            Ok(false) => {}
            Err(e) => warn!(device = %device, error = %e, "bus command failed"),
        }
    }

    fn append(&self, sample: TelemetrySample) {
        if let Err(e) = self.telemetry.append(&sample) {
            warn!(kind = %sample.kind(), error = %e, "failed to append telemetry sample");
        }
    }
}

fn command(payload: &Map<String, Value>) -> Option<&str> {
    payload.get("command").and_then(Value::as_str)
}

fn timestamp(payload: &Map<String, Value>) -> i64 {
    payload
        .get("timestamp")
        .and_then(Value::as_i64)
        .unwrap_or_else(|| chrono::Utc::now().timestamp_millis())
}

fn string_field(payload: &Map<String, Value>, key: &str) -> String {
    payload
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
