//! Telemetry simulators.
//!
//! One independent periodic producer per telemetry kind, synthesizing
//! plausible sensor values for devices without real hardware attached.
//! All producers share the one broker connection; each publishes to its
//! topic and appends to the telemetry store every tick. A stalled or
//! degraded producer affects nothing else.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use homesync_core::{TelemetryKind, TelemetrySample};
use homesync_storage::TelemetryStore;

use crate::client::BrokerClient;

/// Default tick interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Set of periodic telemetry producers.
pub struct Simulators {
    broker: Arc<BrokerClient>,
    telemetry: Arc<TelemetryStore>,
    interval: Duration,
}

impl Simulators {
    pub fn new(broker: Arc<BrokerClient>, telemetry: Arc<TelemetryStore>) -> Self {
        Self {
            broker,
            telemetry,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawn one producer task per telemetry kind.
    pub fn spawn_all(&self) -> Vec<JoinHandle<()>> {
        TelemetryKind::ALL
            .iter()
            .map(|kind| self.spawn_one(*kind))
            .collect()
    }

    fn spawn_one(&self, kind: TelemetryKind) -> JoinHandle<()> {
        let broker = self.broker.clone();
        let telemetry = self.telemetry.clone();
        let interval = self.interval;

        tokio::spawn(async move {
            debug!(%kind, "telemetry simulator started");
            loop {
                let sample = {
                    let mut rng = rand::thread_rng();
                    synthesize(kind, &mut rng)
                };

                let payload = publish_body(&sample);
                match serde_json::to_vec(&payload) {
                    Ok(bytes) => {
                        if let Err(e) = broker.publish(kind.topic(), bytes).await {
                            debug!(%kind, error = %e, "simulated sample not published");
                        }
                    }
                    Err(e) => warn!(%kind, error = %e, "failed to encode simulated sample"),
                }

                if let Err(e) = telemetry.append(&sample) {
                    warn!(%kind, error = %e, "failed to store simulated sample");
                }

                tokio::time::sleep(interval).await;
            }
        })
    }
}

/// Synthesize one sample for a kind. The rules are fixed:
///
/// - temperature: uniform(20, 30)
/// - water heater: temperature uniform(30, 60), status running|stopped
/// - lighting: intensity uniform(100, 800), on iff intensity < 200 or > 600
/// - fps: uniform(20, 60)
/// - surveillance camera: status recording|idle
/// - aircon: temperature uniform(22, 35), humidity uniform(40, 80),
///   cooling ON iff temperature > 28, dehumidifying ON iff humidity > 65
pub fn synthesize(kind: TelemetryKind, rng: &mut impl Rng) -> TelemetrySample {
    let timestamp = chrono::Utc::now().timestamp_millis();
    match kind {
        TelemetryKind::Temperature => TelemetrySample::Temperature {
            value: round2(rng.gen_range(20.0..30.0)),
            timestamp,
        },
        TelemetryKind::WaterHeater => TelemetrySample::WaterHeater {
            temperature: round2(rng.gen_range(30.0..60.0)),
            status: if rng.gen_bool(0.5) { "running" } else { "stopped" }.to_string(),
            timestamp,
        },
        TelemetryKind::LightControl => {
            let intensity = round2(rng.gen_range(100.0..800.0));
            TelemetrySample::LightControl {
                intensity,
                status: if intensity < 200.0 || intensity > 600.0 {
                    "on"
                } else {
                    "off"
                }
                .to_string(),
                timestamp,
            }
        }
        TelemetryKind::Fps => TelemetrySample::Fps {
            fps: round2(rng.gen_range(20.0..60.0)),
            timestamp,
        },
        TelemetryKind::SurveillanceCamera => TelemetrySample::SurveillanceCamera {
            status: if rng.gen_bool(0.5) { "recording" } else { "idle" }.to_string(),
            timestamp,
        },
        TelemetryKind::Aircon => {
            let temperature = round1(rng.gen_range(22.0..35.0));
            let humidity = round1(rng.gen_range(40.0..80.0));
            TelemetrySample::Aircon {
                temperature,
                humidity,
                cooling_status: if temperature > 28.0 { "ON" } else { "OFF" }.to_string(),
                dehumidifying_status: if humidity > 65.0 { "ON" } else { "OFF" }.to_string(),
                timestamp,
            }
        }
    }
}

/// Bus payload for a sample. The temperature stream publishes its reading
/// under the `temperature` key even though the history column is `value`.
pub fn publish_body(sample: &TelemetrySample) -> Value {
    match sample {
        TelemetrySample::Temperature { value, timestamp } => {
            json!({ "temperature": value, "timestamp": timestamp })
        }
        other => other.to_body(),
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aircon_threshold_laws() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let sample = synthesize(TelemetryKind::Aircon, &mut rng);
            let TelemetrySample::Aircon {
                temperature,
                humidity,
                cooling_status,
                dehumidifying_status,
                ..
            } = sample
            else {
                panic!("wrong sample kind");
            };

            assert!((22.0..=35.0).contains(&temperature));
            assert!((40.0..=80.0).contains(&humidity));
            if temperature > 28.0 {
                assert_eq!(cooling_status, "ON");
            } else {
                assert_eq!(cooling_status, "OFF");
            }
            if humidity > 65.0 {
                assert_eq!(dehumidifying_status, "ON");
            } else {
                assert_eq!(dehumidifying_status, "OFF");
            }
        }
    }

    #[test]
    fn test_lighting_intensity_law() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let sample = synthesize(TelemetryKind::LightControl, &mut rng);
            let TelemetrySample::LightControl {
                intensity, status, ..
            } = sample
            else {
                panic!("wrong sample kind");
            };

            assert!((100.0..=800.0).contains(&intensity));
            let expected = if intensity < 200.0 || intensity > 600.0 {
                "on"
            } else {
                "off"
            };
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_value_ranges() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            match synthesize(TelemetryKind::Temperature, &mut rng) {
                TelemetrySample::Temperature { value, .. } => {
                    assert!((20.0..=30.0).contains(&value))
                }
                _ => panic!("wrong sample kind"),
            }
            match synthesize(TelemetryKind::Fps, &mut rng) {
                TelemetrySample::Fps { fps, .. } => assert!((20.0..=60.0).contains(&fps)),
                _ => panic!("wrong sample kind"),
            }
            match synthesize(TelemetryKind::WaterHeater, &mut rng) {
                TelemetrySample::WaterHeater {
                    temperature,
                    status,
                    ..
                } => {
                    assert!((30.0..=60.0).contains(&temperature));
                    assert!(status == "running" || status == "stopped");
                }
                _ => panic!("wrong sample kind"),
            }
        }
    }

    #[test]
    fn test_temperature_publish_body_key() {
        let sample = TelemetrySample::Temperature {
            value: 25.0,
            timestamp: 1,
        };
        let body = publish_body(&sample);
        assert_eq!(body["temperature"], 25.0);
        assert!(body.get("value").is_none());
    }

    #[test]
    fn test_surveillance_status_choice() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            match synthesize(TelemetryKind::SurveillanceCamera, &mut rng) {
                TelemetrySample::SurveillanceCamera { status, .. } => {
                    assert!(status == "recording" || status == "idle")
                }
                _ => panic!("wrong sample kind"),
            }
        }
    }
}
